use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::FieldCatalog;
use crate::clock::{Clock, SystemClock};
use crate::compile::{AuditColumns, FilterCompiler};
use crate::error::GridError;
use crate::params::ParamSource;
use crate::predicate::{Predicate, QueryPlan};
use crate::request::RequestParameters;
use crate::resolver::{GridConfig, ParamResolver};
use crate::shape;
use crate::source::{Row, SelectSource};
use crate::store::FilterStore;

/// Client-facing result envelope.
#[derive(Debug, Clone, Serialize)]
pub struct DataPage {
    pub total: u64,
    pub rows: Vec<Row>,
}

/// One grid: configuration, field metadata, and the read pipeline.
///
/// `fetch` runs resolve -> compile -> plan -> select -> shape and returns
/// the `{total, rows}` envelope. The fetch strategy is the source's
/// concern; the model is identical over SQL-backed and in-memory sources.
pub struct GridModel {
    config: GridConfig,
    catalog: Arc<dyn FieldCatalog>,
    clock: Arc<dyn Clock>,
    timezone: FixedOffset,
    mask: Vec<shape::MaskEntry>,
    renderers: shape::RenderRegistry,
    audit_columns: AuditColumns,
    audit_view: Option<shape::AuditView>,
    sharing: Option<Predicate>,
    collect_ids: bool,
    collected_ids: Vec<Value>,
}

impl GridModel {
    pub fn new(config: GridConfig, catalog: Arc<dyn FieldCatalog>) -> Self {
        Self {
            config,
            catalog,
            clock: Arc::new(SystemClock),
            timezone: Utc.fix(),
            mask: Vec::new(),
            renderers: shape::RenderRegistry::new(),
            audit_columns: AuditColumns::default(),
            audit_view: None,
            sharing: None,
            collect_ids: false,
            collected_ids: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Viewer timezone, used for date filter bounds and audit display.
    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_mask(mut self, mask: Vec<shape::MaskEntry>) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_renderers(mut self, renderers: shape::RenderRegistry) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn with_audit_columns(mut self, audit: AuditColumns) -> Self {
        self.audit_columns = audit;
        self
    }

    /// Enable audit-date localization for an authorized viewer.
    pub fn with_audit_view(mut self, view: shape::AuditView) -> Self {
        self.audit_view = Some(view);
        self
    }

    /// Record-level sharing predicate appended after explicit filters.
    pub fn with_sharing(mut self, predicate: Predicate) -> Self {
        self.sharing = Some(predicate);
        self
    }

    pub fn collect_ids(mut self, on: bool) -> Self {
        self.collect_ids = on;
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn sharing(&self) -> Option<&Predicate> {
        self.sharing.as_ref()
    }

    /// Resolve raw request parameters into a validated snapshot.
    pub fn resolve(
        &self,
        params: &dyn ParamSource,
        store: &dyn FilterStore,
    ) -> Result<RequestParameters, GridError> {
        ParamResolver::new(&self.config, self.catalog.as_ref()).resolve(params, store)
    }

    /// Compile descriptors with this grid's catalog, clock and timezone.
    pub fn compile_filters(
        &self,
        filters: &[trellis_query::FilterDescriptor],
    ) -> Vec<Predicate> {
        FilterCompiler::new(self.catalog.as_ref(), self.clock.as_ref(), self.timezone)
            .with_audit_columns(self.audit_columns.clone())
            .compile(filters)
    }

    /// Build the bounded query plan for a resolved request.
    pub fn plan(&self, request: &RequestParameters) -> QueryPlan {
        let mut predicates = self.compile_filters(request.fast_filter());
        predicates.extend(self.compile_filters(request.direct_filter()));
        if let Some(sharing) = &self.sharing {
            predicates.push(sharing.clone());
        }
        QueryPlan {
            predicates,
            order: request.order().clone(),
            limit: (request.limit() > 0).then(|| request.limit()),
            offset: Some(request.offset()),
        }
    }

    /// Execute a plan and shape the resulting rows.
    pub fn fetch_with_plan(
        &mut self,
        plan: &QueryPlan,
        source: &dyn SelectSource,
    ) -> Result<DataPage, GridError> {
        debug!(
            model = %self.config.model_name,
            predicates = plan.predicates.len(),
            limit = ?plan.limit,
            offset = ?plan.offset,
            "executing grid plan"
        );
        let selected = source.select(plan)?;

        let mut shaper = shape::RowShaper::new(
            &self.mask,
            &self.renderers,
            self.catalog.as_ref(),
            &self.config.primary_key,
        )
        .collect_ids(self.collect_ids);
        if let Some(view) = &self.audit_view {
            shaper = shaper.with_audit(view);
        }

        let mut rows = Vec::new();
        for row in selected.rows {
            let mut row = row?;
            rows.push(shaper.shape(&mut row));
        }
        self.collected_ids = shaper.take_collected();

        Ok(DataPage {
            total: selected.total,
            rows,
        })
    }

    /// The full read path: resolve has already produced `request`.
    pub fn fetch(
        &mut self,
        request: &RequestParameters,
        source: &dyn SelectSource,
    ) -> Result<DataPage, GridError> {
        let plan = self.plan(request);
        self.fetch_with_plan(&plan, source)
    }

    /// Primary-key values collected by the last fetch, in row order.
    pub fn collected_ids(&self) -> &[Value] {
        &self.collected_ids
    }
}
