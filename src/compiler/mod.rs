//! 编译模块：将规则行编译为忽略大小写的正则
pub mod pattern;
pub mod compiler;

pub use self::pattern::{CompiledPattern, CompiledPatternSet};
pub use self::compiler::PatternCompiler;
