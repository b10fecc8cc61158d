/**
 * Resolver Tests
 *
 * Orphan attachment by package prefix, the longest-prefix tie-break, and
 * on-demand template materialization.
 */

#[cfg(test)]
mod tests {
    use mvc_metamodel::{
        ApplicationAnnotation, ClassHandle, ControllerMethodDeclaration, EntityRef, EventKind,
        FieldHandle, Fqn, MetaModel, MethodSignature, PackageHandle, Phase, QName,
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

    mod controller_resolution_tests {
        use super::*;

        #[test]
        fn should_attach_controller_with_exact_package_match() {
            let mut model = MetaModel::new();
            let app = pkg("com.example");
            let owner = cls("com.example.HomeController");
            model.process_application(app.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_controller_method(owner.clone(), &view_method("index")).unwrap();
            model.post_process();

            let controller = model.get_controller(&owner).unwrap();
            assert_eq!(controller.application(), Some(&app));
            let application = model.get_application(&app).unwrap();
            assert!(application.controllers().any(|h| h == &owner));
        }

        #[test]
        fn should_leave_unrelated_controller_orphan() {
            let mut model = MetaModel::new();
            let owner = cls("org.elsewhere.StrayController");
            model
                .process_application(pkg("com.example"), &ApplicationAnnotation::default())
                .unwrap();
            model.process_controller_method(owner.clone(), &view_method("index")).unwrap();
            model.post_process();
            model.pop_events();

            assert!(model.get_controller(&owner).unwrap().is_orphan());

            // Stays orphan on later rounds, without crashing or emitting.
            model.post_process();
            assert!(model.pop_events().is_empty());
            assert!(model.get_controller(&owner).unwrap().is_orphan());
        }

        #[test]
        fn should_prefer_longest_package_prefix() {
            let mut model = MetaModel::new();
            let outer = pkg("com.example");
            let inner = pkg("com.example.admin");
            let owner = cls("com.example.admin.UserController");
            model.process_application(outer.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_application(inner.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_controller_method(owner.clone(), &view_method("index")).unwrap();
            model.post_process();

            let controller = model.get_controller(&owner).unwrap();
            assert_eq!(controller.application(), Some(&inner));
            assert_eq!(model.get_application(&outer).unwrap().controllers().count(), 0);
            assert_eq!(model.get_application(&inner).unwrap().controllers().count(), 1);
        }

        #[test]
        fn should_emit_updated_for_attached_controller_with_new_method() {
            let mut model = MetaModel::new();
            let app = pkg("com.example");
            let owner = cls("com.example.HomeController");
            model.process_application(app, &ApplicationAnnotation::default()).unwrap();
            model.process_controller_method(owner.clone(), &view_method("index")).unwrap();
            model.post_process();
            model.pop_events();

            // Next round: the controller class was recompiled.
            model.process_controller_method(owner.clone(), &view_method("about")).unwrap();
            model.post_process();

            let events = model.pop_events();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].kind, EventKind::Updated);
            assert_eq!(events[0].entity, EntityRef::Controller(owner));
        }
    }

    mod template_resolution_tests {
        use super::*;

        #[test]
        fn should_materialize_template_on_demand() {
            let mut model = MetaModel::new();
            let app = pkg("com.example");
            let field = fld("com.example.HomeController", "home");
            model.process_application(app.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_declaration_template(field.clone(), "home.gtmpl").unwrap();
            model.post_process();

            let application = model.get_application(&app).unwrap();
            let template = application.template("home.gtmpl").unwrap();
            assert!(template.refs().any(|h| h == &field));

            let template_ref = model.get_template_ref(&field).unwrap();
            let key = template_ref.template().unwrap();
            assert_eq!(key.application, app);
            assert_eq!(key.path, "home.gtmpl");

            let events = model.pop_events();
            assert!(events.iter().any(|e| {
                e.kind == EventKind::AfterAdd
                    && matches!(&e.entity, EntityRef::Template { path, .. } if path == "home.gtmpl")
            }));
        }

        #[test]
        fn should_share_template_between_refs_with_same_path() {
            let mut model = MetaModel::new();
            let app = pkg("com.example");
            let first = fld("com.example.HomeController", "home");
            let second = fld("com.example.AboutController", "home");
            model.process_application(app.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_declaration_template(first, "home.gtmpl").unwrap();
            model.process_declaration_template(second, "home.gtmpl").unwrap();
            model.post_process();

            let application = model.get_application(&app).unwrap();
            assert_eq!(application.templates().count(), 1);
            assert_eq!(application.template("home.gtmpl").unwrap().refs().count(), 2);

            let template_adds = model
                .pop_events()
                .into_iter()
                .filter(|e| matches!(e.entity, EntityRef::Template { .. }))
                .count();
            assert_eq!(template_adds, 1);
        }

        #[test]
        fn should_prefer_longest_prefix_for_template_refs() {
            let mut model = MetaModel::new();
            let outer = pkg("com.example");
            let inner = pkg("com.example.admin");
            let field = fld("com.example.admin.UserController", "list");
            model.process_application(outer.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_application(inner.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_declaration_template(field, "list.gtmpl").unwrap();
            model.post_process();

            assert!(model.get_application(&outer).unwrap().template("list.gtmpl").is_none());
            assert!(model.get_application(&inner).unwrap().template("list.gtmpl").is_some());
        }

        #[test]
        fn should_keep_link_when_path_is_unchanged() {
            let mut model = MetaModel::new();
            let app = pkg("com.example");
            let field = fld("com.example.HomeController", "home");
            model.process_application(app, &ApplicationAnnotation::default()).unwrap();
            model.process_declaration_template(field.clone(), "home.gtmpl").unwrap();
            model.post_process();

            model.process_declaration_template(field.clone(), "home.gtmpl").unwrap();
            assert!(!model.get_template_ref(&field).unwrap().is_orphan());
        }

        #[test]
        fn should_rebind_ref_after_path_change() {
            let mut model = MetaModel::new();
            let app = pkg("com.example");
            let field = fld("com.example.HomeController", "home");
            model.process_application(app.clone(), &ApplicationAnnotation::default()).unwrap();
            model.process_declaration_template(field.clone(), "a.gtmpl").unwrap();
            model.post_process();
            model.pop_events();
            model.pre_passivate();

            // Next round: the field declares a different path.
            model.process_declaration_template(field.clone(), "b.gtmpl").unwrap();
            let template_ref = model.get_template_ref(&field).unwrap();
            assert!(template_ref.is_orphan());
            assert_eq!(template_ref.path(), "b.gtmpl");

            model.post_process();
            let application = model.get_application(&app).unwrap();
            assert!(application.template("b.gtmpl").unwrap().refs().any(|h| h == &field));
            // The abandoned template is visible this round, collected at
            // passivation.
            assert!(application.template("a.gtmpl").unwrap().is_unused());
            model.pop_events();
            model.pre_passivate();

            let application = model.get_application(&app).unwrap();
            assert!(application.template("a.gtmpl").is_none());
            assert!(application.template("b.gtmpl").is_some());
        }
    }
}
