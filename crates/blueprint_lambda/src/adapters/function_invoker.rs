pub trait FunctionInvoker {
    /// Fire-and-forget invocation.
    fn invoke_async(&self, function_name: &str, payload: &[u8]) -> Result<(), String>;

    /// Request-response invocation, returning the raw response payload.
    fn invoke_sync(&self, function_name: &str, payload: &[u8]) -> Result<Vec<u8>, String>;
}
