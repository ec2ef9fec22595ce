/*!
 * Analysis
 * Trend regression and the recommendations built on it
 */

mod advisor;
mod trend;

pub use advisor::{advise_gc, advise_heap, GcAdvice};
pub use trend::{Trend, TrendDirection};
