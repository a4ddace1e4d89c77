pub mod request;
pub mod response;

pub use request::{
    ClientInfo, InitializeParams, JsonRpcRequest, ReadResourceParams, RpcId, ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, Resource, ResourceContents, ToolResult, ToolResultContent,
};
