use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use rookdb_core::{DatabaseHandle, FunctionDefinition};

use crate::client::{api_path, RookClient};
use crate::transport::{Method, Request};
use crate::Result;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionCreated {
    #[serde(default)]
    is_newly_created: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionsRemoved {
    #[serde(default)]
    deleted_count: u64,
}

/// Function management.
pub struct FunctionClient {
    client: RookClient,
}

impl FunctionClient {
    pub(crate) fn new(client: RookClient) -> Self {
        Self { client }
    }

    /// Register a server-side function.
    ///
    /// Returns whether the function was newly created; `false` means an
    /// existing definition with the same name was replaced.
    pub async fn create(
        &self,
        database: &DatabaseHandle,
        function: &FunctionDefinition,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let request = Request::new(Method::Post, api_path(database, "function"))
            .with_body(serde_json::to_vec(function)?)
            .with_transaction(database.transaction.clone());

        let created: FunctionCreated = self.client.execute(request, cancel).await?.result_as()?;
        Ok(created.is_newly_created)
    }

    /// List functions, optionally restricted to a namespace prefix.
    pub async fn list(
        &self,
        database: &DatabaseHandle,
        namespace: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FunctionDefinition>> {
        let mut request = Request::new(Method::Get, api_path(database, "function"))
            .with_transaction(database.transaction.clone());
        if let Some(namespace) = namespace {
            request = request.with_query(vec![("namespace", namespace.to_string())]);
        }

        self.client.execute(request, cancel).await?.result_as()
    }

    /// Remove one function, or a whole namespace when `group` is set.
    ///
    /// Returns the number of definitions removed.
    pub async fn remove(
        &self,
        database: &DatabaseHandle,
        name: &str,
        group: bool,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let path = api_path(database, &format!("function/{}", urlencoding::encode(name)));
        let request = Request::new(Method::Delete, path)
            .with_query(vec![("group", group.to_string())])
            .with_transaction(database.transaction.clone());

        let removed: FunctionsRemoved = self.client.execute(request, cancel).await?.result_as()?;
        Ok(removed.deleted_count)
    }
}
