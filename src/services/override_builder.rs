use crate::domain::{Module, ModuleId, ModuleProvider, ModuleRef, OverrideSet};
use crate::services::Compose;

/// Collects replacements for a fixed set of target modules.
///
/// Every `with*` call records one override directive on the owner and hands the owner
/// back. Dropping the builder without calling one records nothing.
pub struct OverrideBuilder<'a, B: Compose> {
    owner: &'a mut B,
    targets: Vec<ModuleId>,
}

impl<'a, B: Compose> OverrideBuilder<'a, B> {
    pub(crate) fn new(owner: &'a mut B, targets: Vec<ModuleId>) -> Self {
        Self { owner, targets }
    }

    pub fn targets(&self) -> &[ModuleId] {
        &self.targets
    }

    pub fn with<M: Module>(self, module: M) -> &'a mut B {
        self.with_all([ModuleRef::instance(module)])
    }

    pub fn with_type<M: Module + Default>(self) -> &'a mut B {
        self.with_all([ModuleRef::of_type::<M>()])
    }

    /// Uses the provider's module as the replacement. Targets the provider declares
    /// itself are not consulted; the override targets are the ones given here.
    pub fn with_provider<P: ModuleProvider>(self, provider: P) -> &'a mut B {
        self.with_all([ModuleRef::provider(provider)])
    }

    /// Registers several replacements against the same targets, preserving their order.
    pub fn with_all<I: IntoIterator<Item = ModuleRef>>(self, replacements: I) -> &'a mut B {
        let Self { owner, targets } = self;
        let replacements: Vec<ModuleRef> = replacements.into_iter().collect();
        if !replacements.is_empty() {
            owner
                .composer()
                .record_override(OverrideSet::new(targets, replacements));
        }
        owner
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Binder, Module, ModuleId, ModuleRef, PropertiesModule};
    use crate::services::{Compose, RuntimeBuilder};

    #[derive(Default)]
    struct Base;

    impl Module for Base {
        fn configure(&self, binder: &mut Binder) {
            binder.bind("base".to_string());
        }
    }

    #[derive(Default)]
    struct Replacement;

    impl Module for Replacement {
        fn configure(&self, binder: &mut Binder) {
            binder.bind("replacement".to_string());
        }
    }

    #[derive(Default)]
    struct Second;

    impl Module for Second {
        fn configure(&self, _binder: &mut Binder) {}
    }

    #[test]
    fn override_keeps_base_in_plain_list() {
        let mut builder = RuntimeBuilder::default();
        builder
            .module(Base)
            .override_modules([ModuleId::of::<Base>()])
            .unwrap()
            .with(Replacement)
            .property("a", "b");

        let descriptor = builder.into_descriptor();
        assert_eq!(
            descriptor.module_ids(),
            vec![ModuleId::of::<Base>(), ModuleId::of::<PropertiesModule>()]
        );
        assert_eq!(descriptor.overrides().len(), 1);

        let set = &descriptor.overrides()[0];
        assert_eq!(set.targets(), [ModuleId::of::<Base>()]);
        assert_eq!(set.replacements().len(), 1);
        assert!(set.replacements()[0].is(ModuleId::of::<Replacement>()));
        assert!(set.shadows(ModuleId::of::<Base>()));
        assert!(!set.shadows(ModuleId::of::<Replacement>()));
    }

    #[test]
    fn with_all_accumulates_in_order() {
        let mut builder = RuntimeBuilder::default();
        builder
            .override_modules([ModuleId::of::<Base>(), ModuleId::of::<Second>()])
            .unwrap()
            .with_all([
                ModuleRef::of_type::<Replacement>(),
                ModuleRef::instance(Second),
            ]);

        let descriptor = builder.into_descriptor();
        let set = &descriptor.overrides()[0];
        assert_eq!(set.targets().len(), 2);
        let ids: Vec<ModuleId> = set.replacements().iter().map(ModuleRef::id).collect();
        assert_eq!(ids, vec![ModuleId::of::<Replacement>(), ModuleId::of::<Second>()]);
    }

    #[test]
    fn unknown_targets_are_accepted() {
        let mut builder = RuntimeBuilder::default();
        builder
            .override_modules([ModuleId::of::<Base>()])
            .unwrap()
            .with_type::<Replacement>();

        let descriptor = builder.into_descriptor();
        assert_eq!(descriptor.overrides().len(), 1);
    }

    #[test]
    fn dropped_override_records_nothing() {
        let mut builder = RuntimeBuilder::default();
        let pending = builder.override_modules([ModuleId::of::<Base>()]).unwrap();
        assert_eq!(pending.targets(), [ModuleId::of::<Base>()]);
        drop(pending);

        assert!(builder.into_descriptor().overrides().is_empty());
    }
}
