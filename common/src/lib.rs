//! FoodBuddy Common Library
//!
//! CLI와 다른 프런트엔드에서 공유되는 타입과 순수 로직

pub mod error;
pub mod parser;
pub mod prompts;
pub mod stats;
pub mod tone;
pub mod types;
pub mod validation;
pub mod wizard;

pub use error::{Error, Result};
pub use parser::{extract_json_object, parse_generated_review, try_parse_generated_review};
pub use prompts::{build_review_prompt, format_won, DEFAULT_CATEGORY, REVIEW_CATEGORIES};
pub use stats::{aggregate, percentage, ReviewStatistics};
pub use tone::{satisfaction_level, Rating, Tone};
pub use types::{
    CompleteReviewRequest, CompleteReviewResponse, Favorite, GeneratedReview, GenerationRequest,
    LineItem, ReceiptDraft, ReceiptFields, Restaurant, ReviewRecord, TopVisited, UserStatistics,
};
pub use wizard::{Wizard, WizardError, WizardState, WizardStep};
