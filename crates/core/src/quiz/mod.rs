//! Quiz session state machine and the study flow built on top of it.

mod config;
mod flow;
mod session;
mod summary;

pub use config::{Direction, SessionConfig};
pub use flow::{CardFace, CardView, FlowError, LiveProgress, StudyFlow, StudyPhase};
pub use session::{Progress, QuizError, QuizSession, incorrect_words};
pub use summary::{EXCELLENT_ACCURACY, SessionSummary, accuracy};
