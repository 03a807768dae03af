pub mod classifier;
pub mod diagnostics;
pub mod io;
pub mod orchestrator;
pub mod pacing;
pub mod prompt;
pub mod recovery;
pub mod screener;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifier::{SkipReason, VerdictClassifier};
pub use diagnostics::RawOutputLog;
pub use orchestrator::{
    classify_stage, search_stage, LogProgress, ProgressObserver, ScreeningOrchestrator,
};
pub use pacing::{FixedDelay, NoDelay, Pacer};
pub use recovery::{recover_verdict, RecoveryError, VerdictResponse};
pub use screener::{rank_and_window, EntityScreener};
pub use traits::{ArticleTextExtractor, SearchClient};
