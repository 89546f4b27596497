//! Mock backend client for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::api::{Api, ApiResponse, ApiResult, QueryArgs, UploadFile};

mock! {
    pub Api {}

    #[async_trait]
    impl Api for Api {
        async fn get(&self, path: &str, query: &QueryArgs) -> ApiResult<ApiResponse>;
        async fn post(
            &self,
            path: &str,
            body: Option<Value>,
            expected: &[u16],
        ) -> ApiResult<ApiResponse>;
        async fn upload(&self, path: &str, file: UploadFile) -> ApiResult<ApiResponse>;
    }
}
