//! Generic controller driving a [`DelegatingResource`]

use async_trait::async_trait;
use chrono::Utc;
use records_models::{AuditInfo, Auditable, Identifiable, Voidable};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;

use super::DelegatingResource;
use crate::{
    config::{RestConfig, RevoidPolicy},
    hooks::ResourceHook,
    representation::{represent, Representable, Representation, RepresentationContext, SimpleObject},
    search::SearchIndex,
    Error, Result,
};

/// Per-request inputs shared by every operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// User recorded in audit fields.
    pub user: String,
    pub representation: Representation,
    pub repr: RepresentationContext,
}

/// Query parameters of a list or search request.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub q: Option<String>,
    /// Raw `v` parameter, echoed into paging links.
    pub v: Option<String>,
    pub limit: usize,
    pub start_index: usize,
    pub include_all: bool,
}

/// Object-safe view of a resource used by the HTTP layer.
#[async_trait]
pub trait RestResource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn retrieve(&self, uuid: &Uuid, ctx: &RequestContext) -> Result<SimpleObject>;

    async fn list(&self, query: &ListQuery, ctx: &RequestContext) -> Result<SimpleObject>;

    async fn create(&self, payload: JsonValue, ctx: &RequestContext) -> Result<SimpleObject>;

    async fn update(
        &self,
        uuid: &Uuid,
        payload: JsonValue,
        ctx: &RequestContext,
    ) -> Result<SimpleObject>;

    /// Soft delete. `None` uses the configured default reason.
    async fn void(
        &self,
        uuid: &Uuid,
        reason: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<SimpleObject>;

    async fn purge(&self, uuid: &Uuid) -> Result<()>;

    /// Refresh the search entry of one entity.
    async fn reindex(&self, uuid: &Uuid) -> Result<()>;

    /// Drop and rebuild this resource's search entries from the store.
    async fn rebuild_index(&self) -> Result<usize>;
}

pub struct ResourceController<R: DelegatingResource> {
    resource: R,
    search_index: Arc<SearchIndex>,
    hooks: Vec<Arc<dyn ResourceHook>>,
    rest: RestConfig,
}

impl<R: DelegatingResource> ResourceController<R> {
    pub fn new(resource: R, search_index: Arc<SearchIndex>, rest: RestConfig) -> Self {
        Self {
            resource,
            search_index,
            hooks: Vec::new(),
            rest,
        }
    }

    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn ResourceHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    async fn load(&self, uuid: &Uuid) -> Result<R::Entity> {
        self.resource
            .store()
            .get(uuid)
            .await?
            .ok_or_else(|| Error::not_found(self.resource.name(), uuid))
    }

    fn require(&self, allowed: bool, operation: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(Error::unsupported(self.resource.name(), operation))
        }
    }

    async fn index(&self, view: &R::View) {
        let document = self.resource.search_document(view);
        self.search_index
            .upsert(self.resource.name(), view.uuid(), document)
            .await;
    }

    fn page_link(
        &self,
        rel: &str,
        query: &ListQuery,
        start_index: usize,
        ctx: &RequestContext,
    ) -> JsonValue {
        let mut params = Vec::new();
        if let Some(q) = &query.q {
            params.push(format!("q={}", urlencoding::encode(q)));
        }
        if let Some(v) = &query.v {
            params.push(format!("v={}", urlencoding::encode(v)));
        }
        if query.include_all {
            params.push("includeAll=true".to_string());
        }
        params.push(format!("limit={}", query.limit));
        params.push(format!("startIndex={start_index}"));

        let uri = format!("{}?{}", ctx.repr.link(self.resource.name()), params.join("&"));
        json!({ "rel": rel, "uri": uri })
    }

    /// Entities matching the query, before paging.
    async fn matching(&self, query: &ListQuery) -> Result<Vec<R::Entity>> {
        let store = self.resource.store();
        match &query.q {
            None => {
                self.require(self.resource.capabilities().get_all, "getAll")?;
                store.list(query.include_all).await
            }
            Some(q) => {
                self.require(self.resource.capabilities().search, "search")?;
                let uuids = self
                    .search_index
                    .search(self.resource.name(), q, query.include_all)
                    .await;
                let mut entities = Vec::with_capacity(uuids.len());
                for uuid in &uuids {
                    // The index may briefly lag behind a concurrent purge.
                    if let Some(entity) = store.get(uuid).await? {
                        entities.push(entity);
                    }
                }
                Ok(entities)
            }
        }
    }
}

#[async_trait]
impl<R: DelegatingResource> RestResource for ResourceController<R> {
    fn name(&self) -> &'static str {
        self.resource.name()
    }

    async fn retrieve(&self, uuid: &Uuid, ctx: &RequestContext) -> Result<SimpleObject> {
        let entity = self.load(uuid).await?;
        let view = self.resource.view(entity).await?;
        represent(&view, &ctx.representation, &ctx.repr)
    }

    async fn list(&self, query: &ListQuery, ctx: &RequestContext) -> Result<SimpleObject> {
        let entities = self.matching(query).await?;
        let total = entities.len();

        let mut results = Vec::new();
        for entity in entities.into_iter().skip(query.start_index).take(query.limit) {
            let view = self.resource.view(entity).await?;
            results.push(represent(&view, &ctx.representation, &ctx.repr)?.into_value());
        }

        let mut links = Vec::new();
        let next = query.start_index.saturating_add(query.limit);
        if next < total {
            links.push(self.page_link("next", query, next, ctx));
        }
        if query.start_index > 0 {
            let prev = query.start_index.saturating_sub(query.limit);
            links.push(self.page_link("prev", query, prev, ctx));
        }

        tracing::debug!(
            resource = self.resource.name(),
            query = query.q.as_deref(),
            total,
            returned = results.len(),
            "Listed resources"
        );

        Ok(SimpleObject::new()
            .add("results", JsonValue::Array(results))
            .add("links", JsonValue::Array(links)))
    }

    async fn create(&self, payload: JsonValue, ctx: &RequestContext) -> Result<SimpleObject> {
        self.require(self.resource.capabilities().create, "create")?;

        let mut entity = self.resource.new_entity(payload).await?;
        *entity.audit_mut() = AuditInfo::created_by(ctx.user.as_str(), Utc::now());

        let created = self.resource.store().insert(entity).await?;
        let uuid = created.uuid();
        let view = self.resource.view(created).await?;
        self.index(&view).await;

        for hook in &self.hooks {
            hook.on_saved(self.resource.name(), &uuid).await?;
        }

        tracing::info!(
            resource = self.resource.name(),
            %uuid,
            user = %ctx.user,
            "Created resource"
        );
        represent(&view, &ctx.representation, &ctx.repr)
    }

    async fn update(
        &self,
        uuid: &Uuid,
        payload: JsonValue,
        ctx: &RequestContext,
    ) -> Result<SimpleObject> {
        self.require(self.resource.capabilities().update, "update")?;

        let existing = self.load(uuid).await?;
        let mut entity = self.resource.apply_update(existing, payload).await?;
        entity.audit_mut().touch(ctx.user.as_str(), Utc::now());

        let updated = self.resource.store().update(entity).await?;
        let view = self.resource.view(updated).await?;
        self.index(&view).await;

        for hook in &self.hooks {
            hook.on_saved(self.resource.name(), uuid).await?;
        }

        tracing::info!(
            resource = self.resource.name(),
            %uuid,
            user = %ctx.user,
            "Updated resource"
        );
        represent(&view, &ctx.representation, &ctx.repr)
    }

    async fn void(
        &self,
        uuid: &Uuid,
        reason: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<SimpleObject> {
        self.require(self.resource.capabilities().void, "void")?;

        let existing = self.load(uuid).await?;
        if existing.is_voided() {
            return match self.rest.revoid_policy {
                RevoidPolicy::Ignore => {
                    tracing::debug!(
                        resource = self.resource.name(),
                        %uuid,
                        "Already voided, nothing to do"
                    );
                    let view = self.resource.view(existing).await?;
                    represent(&view, &ctx.representation, &ctx.repr)
                }
                RevoidPolicy::Reject => Err(Error::AlreadyVoided {
                    resource: self.resource.name().to_string(),
                    uuid: uuid.to_string(),
                }),
            };
        }

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.rest.default_void_reason);
        let voided = self
            .resource
            .store()
            .void(uuid, reason, &ctx.user, Utc::now())
            .await?;
        let view = self.resource.view(voided).await?;
        self.index(&view).await;

        for hook in &self.hooks {
            hook.on_voided(self.resource.name(), uuid).await?;
        }

        tracing::info!(
            resource = self.resource.name(),
            %uuid,
            reason,
            user = %ctx.user,
            "Voided resource"
        );
        represent(&view, &ctx.representation, &ctx.repr)
    }

    async fn purge(&self, uuid: &Uuid) -> Result<()> {
        self.require(self.resource.capabilities().purge, "purge")?;

        let existing = self.load(uuid).await?;
        self.resource.before_purge(&existing).await?;

        if !self.resource.store().purge(uuid).await? {
            return Err(Error::not_found(self.resource.name(), uuid));
        }
        self.search_index.remove(self.resource.name(), uuid).await;

        for hook in &self.hooks {
            hook.on_purged(self.resource.name(), uuid).await?;
        }

        tracing::info!(resource = self.resource.name(), %uuid, "Purged resource");
        Ok(())
    }

    async fn reindex(&self, uuid: &Uuid) -> Result<()> {
        match self.resource.store().get(uuid).await? {
            Some(entity) => {
                let view = self.resource.view(entity).await?;
                self.index(&view).await;
            }
            None => {
                self.search_index.remove(self.resource.name(), uuid).await;
            }
        }
        Ok(())
    }

    async fn rebuild_index(&self) -> Result<usize> {
        self.search_index.clear(self.resource.name()).await;

        let entities = self.resource.store().list(true).await?;
        let count = entities.len();
        for entity in entities {
            let view = self.resource.view(entity).await?;
            self.index(&view).await;
        }

        tracing::debug!(resource = self.resource.name(), count, "Rebuilt search index");
        Ok(count)
    }
}
