//! Metamodel Engine
//!
//! The round-scoped entity graph: registries keyed by identity handle,
//! mutation entry points driven by the compiler frontend, garbage
//! collection against the round's live declarations, resolution of
//! cross-entity ownership, and the drain-once event queue consumed by the
//! generator.
//!
//! One compilation round is `post_activate` (GC) → any number of
//! `process_*` calls → `post_process` (resolution) → generator drains
//! `pop_events` → `pre_passivate` (template GC, queue reset). The graph is
//! serializable between rounds; the queue and logger are transient.

use crate::context::{ApplicationAnnotation, ControllerMethodDeclaration, ProcessingContext};
use crate::error::ModelError;
use crate::event::{EntityRef, MetaModelEvent};
use crate::handle::{ClassHandle, FieldHandle, PackageHandle};
use crate::logging::{LogLevel, Logger, NullLogger};
use crate::meta::application::{ApplicationDeclared, ApplicationMetaModel};
use crate::meta::controller::ControllerMetaModel;
use crate::meta::template::{TemplateKey, TemplateMetaModel, TemplateRefMetaModel};
use crate::name::QName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

fn null_logger() -> Box<dyn Logger> {
    Box::new(NullLogger)
}

/// The incremental metamodel.
///
/// Registries iterate in insertion order; that order is part of the
/// contract because it fixes event emission order and, transitively, the
/// order of generated output. Removals therefore always shift instead of
/// swapping.
#[derive(Serialize, Deserialize)]
pub struct MetaModel {
    applications: IndexMap<PackageHandle, ApplicationMetaModel>,
    controllers: IndexMap<ClassHandle, ControllerMetaModel>,
    template_refs: IndexMap<FieldHandle, TemplateRefMetaModel>,
    #[serde(skip)]
    queue: VecDeque<MetaModelEvent>,
    #[serde(skip, default = "null_logger")]
    logger: Box<dyn Logger>,
}

impl MetaModel {
    pub fn new() -> Self {
        MetaModel {
            applications: IndexMap::new(),
            controllers: IndexMap::new(),
            template_refs: IndexMap::new(),
            queue: VecDeque::new(),
            logger: null_logger(),
        }
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Self {
        let mut model = MetaModel::new();
        model.logger = logger;
        model
    }

    pub fn set_logger(&mut self, logger: Box<dyn Logger>) {
        self.logger = logger;
    }

    // ---- registry reads ------------------------------------------------

    pub fn get_application(&self, handle: &PackageHandle) -> Option<&ApplicationMetaModel> {
        self.applications.get(handle)
    }

    pub fn applications(&self) -> impl Iterator<Item = &ApplicationMetaModel> {
        self.applications.values()
    }

    pub fn get_controller(&self, handle: &ClassHandle) -> Option<&ControllerMetaModel> {
        self.controllers.get(handle)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerMetaModel> {
        self.controllers.values()
    }

    pub fn get_template_ref(&self, handle: &FieldHandle) -> Option<&TemplateRefMetaModel> {
        self.template_refs.get(handle)
    }

    pub fn template_refs(&self) -> impl Iterator<Item = &TemplateRefMetaModel> {
        self.template_refs.values()
    }

    // ---- registry adds -------------------------------------------------

    /// Register an application for a not-yet-registered package handle.
    /// Registering twice is a caller bug.
    pub fn add_application(
        &mut self,
        handle: PackageHandle,
        declared: ApplicationDeclared,
    ) -> Result<(), ModelError> {
        if self.applications.contains_key(&handle) {
            return Err(ModelError::DuplicateEntity(handle.into()));
        }
        self.applications
            .insert(handle.clone(), ApplicationMetaModel::new(handle.clone(), declared));
        self.queue_event(MetaModelEvent::after_add(EntityRef::Application(handle)));
        Ok(())
    }

    /// Register a controller for a not-yet-registered class handle.
    pub fn add_controller(&mut self, handle: ClassHandle) -> Result<(), ModelError> {
        if self.controllers.contains_key(&handle) {
            return Err(ModelError::DuplicateEntity(handle.into()));
        }
        self.controllers
            .insert(handle.clone(), ControllerMetaModel::new(handle.clone()));
        self.queue_event(MetaModelEvent::after_add(EntityRef::Controller(handle)));
        Ok(())
    }

    /// Register a template ref for a not-yet-registered field handle.
    pub fn add_template_ref(&mut self, handle: FieldHandle, path: &str) -> Result<(), ModelError> {
        if self.template_refs.contains_key(&handle) {
            return Err(ModelError::DuplicateEntity(handle.into()));
        }
        self.template_refs
            .insert(handle.clone(), TemplateRefMetaModel::new(handle.clone(), path));
        self.queue_event(MetaModelEvent::after_add(EntityRef::TemplateRef(handle)));
        Ok(())
    }

    // ---- mutation entry points -----------------------------------------

    /// Record an application annotation observed on a package. Creating is
    /// immediate; attribute changes on an existing application are staged
    /// and reconciled during resolution, so repeated calls in one round
    /// collapse to at most one UPDATED event.
    pub fn process_application(
        &mut self,
        handle: PackageHandle,
        annotation: &ApplicationAnnotation,
    ) -> Result<(), ModelError> {
        let declared = ApplicationDeclared::effective(&handle, annotation);
        match self.applications.get_mut(&handle) {
            Some(application) => {
                application.stage(declared);
                Ok(())
            }
            None => self.add_application(handle, declared),
        }
    }

    /// Record a phase annotation observed on a controller method. Creates
    /// the controller on first sight; application linkage is established
    /// only during resolution.
    pub fn process_controller_method(
        &mut self,
        owner: ClassHandle,
        decl: &ControllerMethodDeclaration,
    ) -> Result<(), ModelError> {
        let arity = decl.signature.parameter_types().len();
        if decl.parameter_names.len() != arity || decl.cardinalities.len() != arity {
            return Err(ModelError::ParameterArityMismatch(owner.into()));
        }
        if !self.controllers.contains_key(&owner) {
            self.add_controller(owner.clone())?;
        }
        if let Some(controller) = self.controllers.get_mut(&owner) {
            controller.add_method(decl);
        }
        Ok(())
    }

    /// Record a path annotation observed on a template field. A changed
    /// path detaches the ref from its current template (the template is
    /// collected later if that left it unused) and re-resolves it during
    /// the resolution phase.
    pub fn process_declaration_template(
        &mut self,
        handle: FieldHandle,
        path: &str,
    ) -> Result<(), ModelError> {
        let current = match self.template_refs.get(&handle) {
            Some(r) => r.path.clone(),
            None => return self.add_template_ref(handle, path),
        };
        if current == path {
            return Ok(());
        }
        let key = self.template_refs.get_mut(&handle).and_then(|r| r.template.take());
        if let Some(key) = key {
            let detached = self.detach_ref(&key, &handle);
            debug_assert!(detached, "ref {} was not in its template's ref set", handle);
        }
        if let Some(r) = self.template_refs.get_mut(&handle) {
            r.path = path.to_string();
        }
        Ok(())
    }

    // ---- lifecycle -----------------------------------------------------

    /// Round activation: reconcile the graph against the declarations that
    /// survived into this round. Runs before any mutation so stale entries
    /// never observe this round's new declarations.
    pub fn post_activate(&mut self, ctx: &dyn ProcessingContext) -> Result<(), ModelError> {
        self.gc_applications(ctx)?;
        self.gc_controllers(ctx);
        self.gc_template_refs(ctx);
        Ok(())
    }

    /// Resolution, in fixed order: orphan refs, orphan controllers, then
    /// staged application updates. Appends the round's UPDATED (and lazy
    /// template AFTER_ADD) events.
    pub fn post_process(&mut self) {
        self.resolve_template_refs();
        self.resolve_controllers();
        self.resolve_applications();
    }

    /// Round passivation: collect templates that lost their last ref this
    /// round (deferred here so the generator could still observe them),
    /// then reset the queue. Nothing survives to the next round.
    pub fn pre_passivate(&mut self) {
        self.gc_templates();
        self.queue.clear();
    }

    // ---- garbage collection --------------------------------------------

    fn gc_applications(&mut self, ctx: &dyn ProcessingContext) -> Result<(), ModelError> {
        let handles: Vec<PackageHandle> = self.applications.keys().cloned().collect();
        for handle in handles {
            match ctx.package(&handle) {
                // Packages do not vanish without their application being
                // explicitly superseded; if one did, the graph is corrupt.
                None => return Err(ModelError::InconsistentState(handle.into())),
                Some(decl) => {
                    if decl.application.is_none() {
                        self.remove_application(&handle);
                    }
                }
            }
        }
        Ok(())
    }

    fn remove_application(&mut self, handle: &PackageHandle) {
        self.queue_event(MetaModelEvent::before_remove(EntityRef::Application(
            handle.clone(),
        )));
        let Some(application) = self.applications.shift_remove(handle) else {
            return;
        };
        // Unlink, not delete: the controllers become orphans for this
        // round and may re-resolve elsewhere.
        for class in application.controllers {
            if let Some(controller) = self.controllers.get_mut(&class) {
                controller.application = None;
            }
        }
        // Owned templates go with the application; every ref that pointed
        // at one is detached in the same step.
        for (_, template) in application.templates {
            for field in template.refs {
                if let Some(r) = self.template_refs.get_mut(&field) {
                    r.template = None;
                }
            }
        }
    }

    fn gc_controllers(&mut self, ctx: &dyn ProcessingContext) {
        let handles: Vec<ClassHandle> = self.controllers.keys().cloned().collect();
        for handle in handles {
            let mut removal: Option<Option<PackageHandle>> = None;
            if let Some(controller) = self.controllers.get_mut(&handle) {
                let stale: Vec<_> = controller
                    .methods
                    .keys()
                    .filter(|signature| {
                        !matches!(ctx.method(&handle, signature), Some(decl) if decl.phase.is_some())
                    })
                    .cloned()
                    .collect();
                for signature in &stale {
                    controller.methods.shift_remove(signature);
                }
                if controller.methods.is_empty() {
                    removal = Some(controller.application.take());
                }
            }
            if let Some(owner) = removal {
                self.queue_event(MetaModelEvent::before_remove(EntityRef::Controller(
                    handle.clone(),
                )));
                if let Some(package) = owner {
                    if let Some(application) = self.applications.get_mut(&package) {
                        application.controllers.shift_remove(&handle);
                    }
                }
                self.controllers.shift_remove(&handle);
            }
        }
    }

    fn gc_template_refs(&mut self, ctx: &dyn ProcessingContext) {
        let handles: Vec<FieldHandle> = self.template_refs.keys().cloned().collect();
        for handle in handles {
            let remove = match ctx.field(&handle) {
                None => {
                    self.logger.debug(&format!(
                        "Removing ref {} whose declaration no longer exists",
                        handle
                    ));
                    true
                }
                Some(decl) if decl.path.is_none() => {
                    self.logger
                        .debug(&format!("Removing ref {} that is no longer annotated", handle));
                    true
                }
                Some(_) => false,
            };
            if remove {
                self.queue_event(MetaModelEvent::before_remove(EntityRef::TemplateRef(
                    handle.clone(),
                )));
                let key = self.template_refs.get_mut(&handle).and_then(|r| r.template.take());
                if let Some(key) = key {
                    self.detach_ref(&key, &handle);
                }
                self.template_refs.shift_remove(&handle);
            }
        }
    }

    /// Collect templates whose ref set emptied out. Deliberately deferred
    /// to passivation: a template losing its last ref during the round is
    /// still visible to the generator that consumes the round's events.
    fn gc_templates(&mut self) {
        let handles: Vec<PackageHandle> = self.applications.keys().cloned().collect();
        for handle in handles {
            if let Some(application) = self.applications.get_mut(&handle) {
                let unused: Vec<String> = application
                    .templates
                    .values()
                    .filter(|template| template.is_unused())
                    .map(|template| template.path.clone())
                    .collect();
                for path in unused {
                    application.templates.shift_remove(&path);
                    self.logger
                        .debug(&format!("Collected unused template {}:{}", handle, path));
                }
            }
        }
    }

    // ---- resolution ----------------------------------------------------

    /// Attach every orphan ref to the template at (application, path),
    /// materializing the template on demand. The owning application is the
    /// one whose package is the longest prefix of the field's package.
    fn resolve_template_refs(&mut self) {
        let orphans: Vec<(FieldHandle, String)> = self
            .template_refs
            .values()
            .filter(|r| r.template.is_none())
            .map(|r| (r.handle.clone(), r.path.clone()))
            .collect();
        for (field, path) in orphans {
            let Some(app_handle) = self.best_match(field.package()) else {
                continue;
            };
            let mut created = false;
            if let Some(application) = self.applications.get_mut(&app_handle) {
                let template = application
                    .templates
                    .entry(path.clone())
                    .or_insert_with(|| {
                        created = true;
                        TemplateMetaModel::new(path.clone())
                    });
                template.refs.insert(field.clone());
            }
            if created {
                self.queue_event(MetaModelEvent::after_add(EntityRef::Template {
                    application: app_handle.clone(),
                    path: path.clone(),
                }));
            }
            if let Some(r) = self.template_refs.get_mut(&field) {
                r.template = Some(TemplateKey {
                    application: app_handle,
                    path,
                });
            }
        }
    }

    /// Attach orphan controllers by the same longest-prefix rule; emit
    /// UPDATED for attached controllers whose methods changed this round.
    fn resolve_controllers(&mut self) {
        let handles: Vec<ClassHandle> = self.controllers.keys().cloned().collect();
        for handle in handles {
            let (orphan, modified) = match self.controllers.get(&handle) {
                Some(controller) => (controller.application.is_none(), controller.modified),
                None => continue,
            };
            if orphan {
                let Some(app_handle) = self.best_match(handle.package()) else {
                    continue;
                };
                if let Some(application) = self.applications.get_mut(&app_handle) {
                    application.controllers.insert(handle.clone());
                }
                if let Some(controller) = self.controllers.get_mut(&handle) {
                    controller.application = Some(app_handle);
                    controller.modified = false;
                }
            } else if modified {
                if let Some(controller) = self.controllers.get_mut(&handle) {
                    controller.modified = false;
                }
                self.queue_event(MetaModelEvent::updated(EntityRef::Controller(handle)));
            }
        }
    }

    /// Apply staged attribute changes and emit one UPDATED per modified
    /// application.
    fn resolve_applications(&mut self) {
        let handles: Vec<PackageHandle> = self.applications.keys().cloned().collect();
        for handle in handles {
            let mut emit = false;
            if let Some(application) = self.applications.get_mut(&handle) {
                if application.modified {
                    application.apply_pending();
                    application.modified = false;
                    emit = true;
                }
            }
            if emit {
                self.queue_event(MetaModelEvent::updated(EntityRef::Application(handle)));
            }
        }
    }

    /// Application whose package is the longest prefix of `package`, if
    /// any. Longest-prefix-wins is the tie-break when several application
    /// packages enclose the same declaration.
    fn best_match(&self, package: &QName) -> Option<PackageHandle> {
        self.applications
            .keys()
            .filter(|handle| handle.package().is_prefix_of(package))
            .max_by_key(|handle| handle.package().len())
            .cloned()
    }

    /// Remove `field` from the ref set of the template at `key`. Returns
    /// whether the ref was actually there.
    fn detach_ref(&mut self, key: &TemplateKey, field: &FieldHandle) -> bool {
        if let Some(application) = self.applications.get_mut(&key.application) {
            if let Some(template) = application.templates.get_mut(&key.path) {
                return template.refs.shift_remove(field);
            }
        }
        false
    }

    // ---- event queue ---------------------------------------------------

    fn queue_event(&mut self, event: MetaModelEvent) {
        if self.logger.is_enabled(LogLevel::Debug) {
            self.logger
                .debug(&format!("Queue event {:?} {}", event.kind, event.entity));
        }
        self.queue.push_back(event);
    }

    /// Drain the whole queue in FIFO order. The queue is consumed exactly
    /// once per round; draining clears it.
    pub fn pop_events(&mut self) -> Vec<MetaModelEvent> {
        self.queue.drain(..).collect()
    }

    /// Pop the oldest event, if any.
    pub fn pop_event(&mut self) -> Option<MetaModelEvent> {
        self.queue.pop_front()
    }

    pub fn has_events(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl Default for MetaModel {
    fn default() -> Self {
        Self::new()
    }
}
