pub const NOTES_HEADER: &str = "**Meeting Notes**";
pub const ACTIONS_HEADER: &str = "**Action Items**";

pub(crate) fn system_prompt() -> String {
    "You are a precise minute-taker. You only report what the transcript says.".to_string()
}

pub(crate) fn build_prompt(transcript: &str) -> String {
    format!(
        "Generate a structured summary of the following transcript.\n\n\
         Format requirements:\n\
         - Use Markdown.\n\
         - Section 1: \"{notes}\" (key discussion points, decisions).\n\
         - Section 2: \"{actions}\" (checklist of tasks, each assigned to the person who took it on).\n\n\
         Transcript:\n\
         <transcript>\n{transcript}\n</transcript>",
        notes = NOTES_HEADER,
        actions = ACTIONS_HEADER,
        transcript = transcript
    )
}
