/// A short product-launch planning meeting, handy for trying the pipeline.
pub const SAMPLE_TRANSCRIPT: &str = "\
Speaker 1: Alright, let's get started. The main goal today is to finalize the launch date for the mobile app.
Speaker 2: I've spoken with the dev team. They still need about two weeks to clear the critical bugs in the login module.
Speaker 1: Two weeks? That pushes us past our Q3 deadline.
Speaker 2: Yes, but if we launch now, user retention will suffer. It's better to delay.
Speaker 3: Marketing is ready to go, but we can pause the ad spend. I agree, quality first.
Speaker 1: Okay. Let's officially move the launch date to October 15th.
Speaker 2: I'll notify the engineering team.
Speaker 3: I will update the social media calendar.
Speaker 1: Great. Also, we need to hire a new QA lead by next Friday.
Speaker 2: Agreed. I'll post the job listing tomorrow.";
