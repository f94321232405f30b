pub mod client;
pub mod collections;
pub mod config;
pub mod dataset;
pub mod geometry;
pub mod quadtree;

use std::error::Error;

// 重新导出主要的公共接口
pub use collections::{PriorityQueue, QueueError};
pub use geometry::{Coordinate, Rectangle};
pub use quadtree::{DoubleBitsError, IndexError, QuadKey, QuadtreeIndex, SpatialIndex};

// 重新导出常用类型，便于二进制文件使用
pub use client::{CliArgs, OutputFormatter};
pub use config::NetrouteConfig;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;
