//! Built-in question banks, used when the backend does not supply prompts.

use crate::config::InterviewType;

const OPENING_QUESTION: &str = "Tell me about your background and experience in this role?";

const BEHAVIORAL_BANK: &[&str] = &[
    "What are your key strengths and how do they apply to this role?",
    "Describe a challenging project you worked on and how you solved it.",
    "How do you handle conflicts or disagreements with team members?",
    "What is your approach to learning new technologies and frameworks?",
    "Tell me about your proudest achievement in your career.",
];

const TECHNICAL_BANK: &[&str] = &[
    "Walk me through the architecture of a system you designed recently.",
    "How do you decide between consistency and availability in a distributed design?",
    "Describe how you would debug a service whose latency doubled overnight.",
    "What trade-offs do you weigh when choosing a data store for a new feature?",
    "How do you keep a large codebase maintainable as the team grows?",
    "Explain a performance problem you found in production and how you fixed it.",
];

const CODING_BANK: &[&str] = &[
    "Describe how you would detect a cycle in a linked list and its complexity.",
    "How would you design a rate limiter, and what data structures back it?",
    "Explain the difference between depth-first and breadth-first traversal and when each wins.",
    "How do you approach writing tests for a function with many edge cases?",
    "Talk through optimizing a hot loop that dominates a profiler trace.",
    "How would you deduplicate a very large file that does not fit in memory?",
];

fn bank(interview_type: InterviewType) -> Vec<&'static str> {
    match interview_type {
        InterviewType::Behavioral => BEHAVIORAL_BANK.to_vec(),
        InterviewType::Technical => TECHNICAL_BANK.to_vec(),
        InterviewType::Coding => CODING_BANK.to_vec(),
        InterviewType::Full => {
            // Interleave so a short budget still touches every flavor.
            let mut mixed = Vec::new();
            let longest = BEHAVIORAL_BANK
                .len()
                .max(TECHNICAL_BANK.len())
                .max(CODING_BANK.len());
            for i in 0..longest {
                for source in [TECHNICAL_BANK, BEHAVIORAL_BANK, CODING_BANK] {
                    if let Some(question) = source.get(i) {
                        mixed.push(*question);
                    }
                }
            }
            mixed
        }
    }
}

/// Ordered prompt list for one session: the opening question followed by the
/// flavor's bank, cycled if the budget outruns it.
pub fn prompts_for(interview_type: InterviewType, budget: usize) -> Vec<String> {
    let bank = bank(interview_type);
    let mut prompts = Vec::with_capacity(budget);
    prompts.push(OPENING_QUESTION.to_string());
    let mut i = 0;
    while prompts.len() < budget {
        prompts.push(bank[i % bank.len()].to_string());
        i += 1;
    }
    prompts.truncate(budget);
    prompts
}
