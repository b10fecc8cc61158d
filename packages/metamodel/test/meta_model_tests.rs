/**
 * Meta Model Tests
 *
 * Mutation entry points: registration, idempotent re-processing, staged
 * attribute updates, and event ordering.
 */

#[cfg(test)]
mod tests {
    use mvc_metamodel::{
        ApplicationAnnotation, Cardinality, ClassHandle, ControllerMethodDeclaration, EntityRef,
        EventKind, FieldHandle, Fqn, MetaModel, MethodSignature, ModelError, PackageHandle, Phase,
        QName,
    };

    fn pkg(name: &str) -> PackageHandle {
        PackageHandle::new(QName::new(name))
    }

    fn cls(name: &str) -> ClassHandle {
        ClassHandle::new(Fqn::parse(name))
    }

    fn fld(owner: &str, name: &str) -> FieldHandle {
        FieldHandle::new(Fqn::parse(owner), name)
    }

    fn view_method(name: &str) -> ControllerMethodDeclaration {
        ControllerMethodDeclaration {
            signature: MethodSignature::new(name, vec![]),
            phase: Phase::View,
            id: None,
            parameter_names: vec![],
            cardinalities: vec![],
        }
    }

    mod application_tests {
        use super::*;

        #[test]
        fn should_register_application_and_queue_after_add() {
            let mut model = MetaModel::new();
            let handle = pkg("com.example.shop");
            model
                .process_application(handle.clone(), &ApplicationAnnotation::default())
                .unwrap();

            assert!(model.get_application(&handle).is_some());
            let events = model.pop_events();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].kind, EventKind::AfterAdd);
            assert_eq!(events[0].entity, EntityRef::Application(handle));
        }

        #[test]
        fn should_default_display_name_from_package() {
            let mut model = MetaModel::new();
            let handle = pkg("com.example.shop");
            model
                .process_application(handle.clone(), &ApplicationAnnotation::default())
                .unwrap();
            assert_eq!(model.get_application(&handle).unwrap().name(), "ShopApplication");
        }

        #[test]
        fn should_prefer_declared_display_name() {
            let mut model = MetaModel::new();
            let handle = pkg("com.example.shop");
            let annotation = ApplicationAnnotation {
                name: Some("Storefront".to_string()),
                ..Default::default()
            };
            model.process_application(handle.clone(), &annotation).unwrap();
            assert_eq!(model.get_application(&handle).unwrap().name(), "Storefront");
        }

        #[test]
        fn should_collapse_repeated_identical_processing() {
            let mut model = MetaModel::new();
            let handle = pkg("com.example.shop");
            let annotation = ApplicationAnnotation::default();
            model.process_application(handle.clone(), &annotation).unwrap();
            model.post_process();
            model.pop_events();

            // Same declaration re-observed twice in a later round.
            model.process_application(handle.clone(), &annotation).unwrap();
            model.process_application(handle.clone(), &annotation).unwrap();
            model.post_process();

            assert!(model.pop_events().is_empty());
            let applications: Vec<_> = model.applications().collect();
            assert_eq!(applications.len(), 1);
        }

        #[test]
        fn should_emit_single_updated_event_for_changed_attribute() {
            let mut model = MetaModel::new();
            let handle = pkg("com.example.shop");
            model
                .process_application(handle.clone(), &ApplicationAnnotation::default())
                .unwrap();
            model.post_process();
            model.pop_events();

            let changed = ApplicationAnnotation {
                escape_xml: Some(true),
                ..Default::default()
            };
            model.process_application(handle.clone(), &changed).unwrap();
            model.process_application(handle.clone(), &changed).unwrap();

            // Attribute change is staged until resolution.
            assert_eq!(model.get_application(&handle).unwrap().escape_xml(), None);
            model.post_process();
            assert_eq!(model.get_application(&handle).unwrap().escape_xml(), Some(true));

            let events = model.pop_events();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].kind, EventKind::Updated);
            assert_eq!(events[0].entity, EntityRef::Application(handle));
        }

        #[test]
        fn should_reject_duplicate_registration() {
            let mut model = MetaModel::new();
            let handle = pkg("com.example.shop");
            model
                .process_application(handle.clone(), &ApplicationAnnotation::default())
                .unwrap();

            let declared = mvc_metamodel::ApplicationDeclared::effective(
                &handle,
                &ApplicationAnnotation::default(),
            );
            let err = model.add_application(handle.clone(), declared).unwrap_err();
            assert!(matches!(err, ModelError::DuplicateEntity(_)));
        }
    }

    mod controller_tests {
        use super::*;

        #[test]
        fn should_create_controller_on_first_method() {
            let mut model = MetaModel::new();
            let owner = cls("com.example.shop.CartController");
            model
                .process_controller_method(owner.clone(), &view_method("index"))
                .unwrap();

            let controller = model.get_controller(&owner).unwrap();
            assert!(controller.is_orphan());
            assert_eq!(controller.methods().count(), 1);
        }

        #[test]
        fn should_record_method_attributes() {
            let mut model = MetaModel::new();
            let owner = cls("com.example.shop.CartController");
            let decl = ControllerMethodDeclaration {
                signature: MethodSignature::new(
                    "add",
                    vec!["String".to_string(), "String[]".to_string()],
                ),
                phase: Phase::Action,
                id: Some("addToCart".to_string()),
                parameter_names: vec!["item".to_string(), "options".to_string()],
                cardinalities: vec![Cardinality::Single, Cardinality::Multiple],
            };
            model.process_controller_method(owner.clone(), &decl).unwrap();

            let controller = model.get_controller(&owner).unwrap();
            let method = controller.method(&decl.signature).unwrap();
            assert_eq!(method.name(), "add");
            assert_eq!(method.phase(), Phase::Action);
            assert_eq!(method.id(), Some("addToCart"));
            assert_eq!(method.parameter_names(), ["item", "options"]);
            assert_eq!(method.parameter_types(), ["String", "String[]"]);
            assert_eq!(
                method.cardinalities(),
                [Cardinality::Single, Cardinality::Multiple]
            );
        }

        #[test]
        fn should_reject_mismatched_parameter_metadata() {
            let mut model = MetaModel::new();
            let owner = cls("com.example.shop.CartController");
            let decl = ControllerMethodDeclaration {
                signature: MethodSignature::new("add", vec!["String".to_string()]),
                phase: Phase::Action,
                id: None,
                parameter_names: vec![],
                cardinalities: vec![Cardinality::Single],
            };
            let err = model.process_controller_method(owner, &decl).unwrap_err();
            assert!(matches!(err, ModelError::ParameterArityMismatch(_)));
        }
    }

    mod template_ref_tests {
        use super::*;

        #[test]
        fn should_register_template_ref_once() {
            let mut model = MetaModel::new();
            let field = fld("com.example.shop.CartController", "index");
            model
                .process_declaration_template(field.clone(), "index.gtmpl")
                .unwrap();
            model
                .process_declaration_template(field.clone(), "index.gtmpl")
                .unwrap();

            let refs: Vec<_> = model.template_refs().collect();
            assert_eq!(refs.len(), 1);
            assert_eq!(refs[0].path(), "index.gtmpl");
            assert!(refs[0].is_orphan());
        }
    }

    mod event_queue_tests {
        use super::*;

        #[test]
        fn should_order_adds_in_call_order() {
            let mut model = MetaModel::new();
            let app = pkg("com.example.shop");
            let owner = cls("com.example.shop.CartController");
            model
                .process_application(app.clone(), &ApplicationAnnotation::default())
                .unwrap();
            model
                .process_controller_method(owner.clone(), &view_method("index"))
                .unwrap();
            model.post_process();

            let events = model.pop_events();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].kind, EventKind::AfterAdd);
            assert_eq!(events[0].entity, EntityRef::Application(app.clone()));
            assert_eq!(events[1].kind, EventKind::AfterAdd);
            assert_eq!(events[1].entity, EntityRef::Controller(owner.clone()));

            // First resolution attached the controller without an update.
            let controller = model.get_controller(&owner).unwrap();
            assert_eq!(controller.application(), Some(&app));
        }

        #[test]
        fn should_drain_in_fifo_order_and_clear() {
            let mut model = MetaModel::new();
            model
                .process_application(pkg("com.a"), &ApplicationAnnotation::default())
                .unwrap();
            model
                .process_application(pkg("com.b"), &ApplicationAnnotation::default())
                .unwrap();

            assert!(model.has_events());
            let first = model.pop_event().unwrap();
            assert_eq!(first.entity, EntityRef::Application(pkg("com.a")));
            let second = model.pop_event().unwrap();
            assert_eq!(second.entity, EntityRef::Application(pkg("com.b")));
            assert!(model.pop_event().is_none());
            assert!(!model.has_events());
        }
    }
}
