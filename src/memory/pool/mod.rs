/*!
 * Memory Pools
 * Size-classed object pools with adaptive expand/shrink
 */

mod manager;
mod object;
mod size_class;

pub use manager::{PoolManager, PoolManagerStats};
pub use object::{PoolObject, SizeClass};
pub use size_class::{Pool, PoolAdjustment, PoolStats};
