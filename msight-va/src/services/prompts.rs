//! Extraction task catalog
//!
//! One narrative task plus five structured-extraction tasks. Each
//! structured prompt embeds the canonical athlete names so the oracle is
//! steered toward consistent naming, and pins down the exact JSON shape
//! expected back.

/// Free-text narrative request, issued first and alone
pub const NARRATIVE_PROMPT: &str = "You are an expert taekwondo match analyst. \
Watch this match video and write a full match narrative: how each round unfolded, \
momentum shifts, decisive exchanges, and the final outcome. \
Always refer to each athlete by their displayed name, followed by their country code \
in parentheses when visible, e.g. \"Seif Eissa (EGY)\". Respond with plain prose only.";

/// The five structured extraction tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Score,
    Punch,
    Kick,
    Violation,
    Advice,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Score,
        TaskKind::Punch,
        TaskKind::Kick,
        TaskKind::Violation,
        TaskKind::Advice,
    ];

    /// Key used in the aggregate's error map and in logs
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Score => "score",
            TaskKind::Punch => "punch",
            TaskKind::Kick => "kick",
            TaskKind::Violation => "violation",
            TaskKind::Advice => "advice",
        }
    }

    /// Build this task's prompt around the canonical athlete names
    pub fn prompt(self, names: &[String; 2]) -> String {
        let naming = format!(
            "The two athletes in this match are \"{}\" and \"{}\". \
             Use exactly these names in the \"name\" fields, in this order. \
             Respond with a single JSON object and nothing else: no markdown fences, \
             no commentary.",
            names[0], names[1]
        );

        match self {
            TaskKind::Score => format!(
                "{naming}\n\nExtract the point-scoring timeline of this taekwondo match. \
                 Return {{\"players\": [{{\"name\", \"total\", \"events\": \
                 [{{\"timestamp\": \"MM:SS\", \"description\", \"value\"}}]}}]}} where \
                 \"total\" is the athlete's final score and each event is one scoring \
                 action with the points awarded as \"value\"."
            ),
            TaskKind::Punch => format!(
                "{naming}\n\nExtract the punch timeline of this match. \
                 Return {{\"players\": [{{\"name\", \"total\", \"events\": \
                 [{{\"timestamp\": \"MM:SS\", \"description\", \"value\"}}]}}]}} where \
                 \"total\" counts all punches thrown by that athlete and each event is \
                 one punch with \"value\": 1."
            ),
            TaskKind::Kick => format!(
                "{naming}\n\nExtract the kick timeline of this match. \
                 Return {{\"players\": [{{\"name\", \"total\", \"events\": \
                 [{{\"timestamp\": \"MM:SS\", \"description\", \"value\"}}]}}]}} where \
                 \"total\" counts all kicks attempted by that athlete, \"description\" \
                 names the kick technique, and \"value\" is 1 per kick."
            ),
            TaskKind::Violation => format!(
                "{naming}\n\nExtract the penalty timeline of this match: every gam-jeom \
                 (yellow card) called by the referee. \
                 Return {{\"players\": [{{\"name\", \"total\", \"events\": \
                 [{{\"timestamp\": \"MM:SS\", \"description\", \"value\"}}]}}]}} where \
                 \"total\" counts penalties against that athlete and \"description\" \
                 states the infraction."
            ),
            TaskKind::Advice => format!(
                "{naming}\n\nProvide coaching advice for each athlete based on this match. \
                 Return {{\"players\": [{{\"name\", \
                 \"tacticalAdvice\": {{\"issues\": [], \"improvements\": []}}, \
                 \"technicalAdvice\": {{\"issues\": [], \"improvements\": []}}, \
                 \"mentalAdvice\": {{\"issues\": [], \"improvements\": []}}}}]}} with \
                 concrete, specific observations in every list."
            ),
        }
    }
}
