pub mod posting;
pub mod profile;

pub use posting::{JobPosting, Recommendation};
pub use profile::{CareerHistory, ExperienceTier, FeedbackData, RatingWithJobInfo, UserProfile};
