//! Resource and data-source traits
//!
//! Adapters implement the typed [`Resource`] / [`DataSource`] traits against
//! their own state structs. The host drives them through the object-safe
//! [`DynResource`] / [`DynDataSource`] traits, which exchange state as JSON
//! objects and report failures as [`Diagnostics`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use super::diagnostics::Diagnostics;
use super::plan::PlannedChange;
use super::schema::Schema;
use crate::api::{OpContext, ProviderError, Result};

/// Bound shared by every typed state/model struct
pub trait StateModel: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> StateModel for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// A remote entity whose lifecycle the provider manages
#[async_trait]
pub trait Resource: Send + Sync {
    type State: StateModel;

    /// Appended to the provider type name: `"app_secret"` -> `"bitrise_app_secret"`
    fn type_suffix(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Static checks on a configuration that already matched the schema
    fn validate(&self, _config: &Self::State) -> Diagnostics {
        Diagnostics::new()
    }

    /// Resource-specific plan adjustment, run after the schema-driven step
    fn modify_plan(&self, _prior: Option<&Self::State>, planned: Self::State) -> Self::State {
        planned
    }

    async fn create(&self, ctx: &OpContext, plan: Self::State) -> Result<Self::State>;

    /// `Ok(None)` means the entity is gone and must be dropped from state
    async fn read(&self, ctx: &OpContext, state: Self::State) -> Result<Option<Self::State>>;

    async fn update(&self, ctx: &OpContext, prior: Self::State, plan: Self::State) -> Result<Self::State>;

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> Result<()>;

    /// Seed state from an import identifier; no network access
    fn import_state(&self, id: &str) -> Result<Self::State>;
}

/// Read-only projection of remote data
#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: StateModel;

    fn type_suffix(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn validate(&self, _config: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    async fn read(&self, ctx: &OpContext, config: Self::Model) -> Result<Self::Model>;
}

/// Object-safe resource interface driven by the host
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &str;
    fn schema(&self) -> Schema;
    fn validate(&self, config: &Value) -> Diagnostics;
    fn plan(&self, prior: Option<&Value>, proposed: Value) -> Result<PlannedChange, Diagnostics>;
    async fn create(&self, ctx: &OpContext, plan: Value) -> Result<Value, Diagnostics>;
    async fn read(&self, ctx: &OpContext, state: Value) -> Result<Option<Value>, Diagnostics>;
    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> Result<Value, Diagnostics>;
    async fn delete(&self, ctx: &OpContext, state: Value) -> Result<(), Diagnostics>;
    fn import_state(&self, id: &str) -> Result<Value, Diagnostics>;
}

/// Object-safe data-source interface driven by the host
#[async_trait]
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &str;
    fn schema(&self) -> Schema;
    fn validate(&self, config: &Value) -> Diagnostics;
    async fn read(&self, ctx: &OpContext, config: Value) -> Result<Value, Diagnostics>;
}

fn decode<T: DeserializeOwned>(kind: &'static str, value: Value) -> Result<T, Diagnostics> {
    serde_json::from_value(value)
        .map_err(|source| ProviderError::InvalidDocument { kind, source }.into())
}

fn encode<T: Serialize>(value: &T) -> Result<Value, Diagnostics> {
    serde_json::to_value(value).map_err(|source| {
        ProviderError::InvalidDocument {
            kind: "state",
            source,
        }
        .into()
    })
}

/// Registers a typed [`Resource`] under its full type name
pub struct ResourceHandle<R> {
    type_name: String,
    inner: R,
}

impl<R: Resource> ResourceHandle<R> {
    pub fn new(provider_type: &str, inner: R) -> Self {
        Self {
            type_name: format!("{}_{}", provider_type, inner.type_suffix()),
            inner,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: Resource> DynResource for ResourceHandle<R> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> Schema {
        self.inner.schema()
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = self.inner.schema().validate_config(config);
        if diags.has_error() {
            return diags;
        }

        match decode::<R::State>("config", config.clone()) {
            Ok(typed) => diags.extend(self.inner.validate(&typed)),
            Err(errors) => diags.extend(errors),
        }
        diags
    }

    fn plan(&self, prior: Option<&Value>, proposed: Value) -> Result<PlannedChange, Diagnostics> {
        let mut change = self.inner.schema().plan(prior, proposed)?;

        let prior = match prior {
            Some(value) if !value.is_null() => Some(decode::<R::State>("state", value.clone())?),
            _ => None,
        };
        let planned = decode::<R::State>("plan", std::mem::take(&mut change.planned_state))?;

        let planned = self.inner.modify_plan(prior.as_ref(), planned);
        change.planned_state = encode(&planned)?;
        Ok(change)
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> Result<Value, Diagnostics> {
        let plan = decode::<R::State>("plan", plan)?;
        let span = tracing::info_span!("create", resource = %self.type_name);
        let state = self.inner.create(ctx, plan).instrument(span).await?;
        encode(&state)
    }

    async fn read(&self, ctx: &OpContext, state: Value) -> Result<Option<Value>, Diagnostics> {
        let state = decode::<R::State>("state", state)?;
        let span = tracing::info_span!("read", resource = %self.type_name);
        match self.inner.read(ctx, state).instrument(span).await? {
            Some(state) => encode(&state).map(Some),
            None => {
                tracing::warn!(resource = %self.type_name, "remote entity gone, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> Result<Value, Diagnostics> {
        let prior = decode::<R::State>("state", prior)?;
        let plan = decode::<R::State>("plan", plan)?;
        let span = tracing::info_span!("update", resource = %self.type_name);
        let state = self.inner.update(ctx, prior, plan).instrument(span).await?;
        encode(&state)
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> Result<(), Diagnostics> {
        let state = decode::<R::State>("state", state)?;
        let span = tracing::info_span!("delete", resource = %self.type_name);
        self.inner.delete(ctx, state).instrument(span).await?;
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, Diagnostics> {
        let state = self.inner.import_state(id)?;
        tracing::info!(resource = %self.type_name, id, "imported");
        encode(&state)
    }
}

/// Registers a typed [`DataSource`] under its full type name
pub struct DataSourceHandle<D> {
    type_name: String,
    inner: D,
}

impl<D: DataSource> DataSourceHandle<D> {
    pub fn new(provider_type: &str, inner: D) -> Self {
        Self {
            type_name: format!("{}_{}", provider_type, inner.type_suffix()),
            inner,
        }
    }
}

#[async_trait]
impl<D: DataSource> DynDataSource for DataSourceHandle<D> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> Schema {
        self.inner.schema()
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = self.inner.schema().validate_config(config);
        if diags.has_error() {
            return diags;
        }

        match decode::<D::Model>("config", config.clone()) {
            Ok(typed) => diags.extend(self.inner.validate(&typed)),
            Err(errors) => diags.extend(errors),
        }
        diags
    }

    async fn read(&self, ctx: &OpContext, config: Value) -> Result<Value, Diagnostics> {
        let config = decode::<D::Model>("config", config)?;
        let span = tracing::info_span!("read_data_source", data_source = %self.type_name);
        let model = self.inner.read(ctx, config).instrument(span).await?;
        encode(&model)
    }
}
