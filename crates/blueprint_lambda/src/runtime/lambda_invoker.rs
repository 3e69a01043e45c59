//! Function-invocation client shared by the poller and harness binaries.

use aws_sdk_lambda::types::InvocationType;

use crate::adapters::function_invoker::FunctionInvoker;

pub struct LambdaFunctionInvoker {
    lambda_client: aws_sdk_lambda::Client,
}

impl LambdaFunctionInvoker {
    pub fn new(lambda_client: aws_sdk_lambda::Client) -> LambdaFunctionInvoker {
        LambdaFunctionInvoker { lambda_client }
    }
}

impl FunctionInvoker for LambdaFunctionInvoker {
    fn invoke_async(&self, function_name: &str, payload: &[u8]) -> Result<(), String> {
        let client = self.lambda_client.clone();
        let function_name = function_name.to_string();
        let request_payload = payload.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .invoke()
                    .function_name(function_name)
                    .invocation_type(InvocationType::Event)
                    .set_payload(Some(request_payload.into()))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to invoke function: {error}"))
            })
        })
    }

    fn invoke_sync(&self, function_name: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
        let client = self.lambda_client.clone();
        let function_name = function_name.to_string();
        let request_payload = payload.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .invoke()
                    .function_name(function_name)
                    .invocation_type(InvocationType::RequestResponse)
                    .set_payload(Some(request_payload.into()))
                    .send()
                    .await
                    .map_err(|error| format!("failed to invoke function: {error}"))?;
                Ok(output
                    .payload()
                    .map(|blob| blob.as_ref().to_vec())
                    .unwrap_or_default())
            })
        })
    }
}
