pub mod availability;

use shelfcheck_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(availability::create_module());
}
