use async_trait::async_trait;
use crate::dsl::WorkflowGraph;
use crate::error::DispatchError;
use std::fmt::Debug;

pub mod http;

/// 后端接口：把工作流交给图像生成后端
///
/// One call is one attempt. Implementations must not retry; the backend's
/// work happens out of band and is observed only through the output directory.
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    async fn queue_prompt(&self, graph: &WorkflowGraph) -> Result<(), DispatchError>;
}
