mod dependency_selector;

pub use dependency_selector::DependencySelector;
