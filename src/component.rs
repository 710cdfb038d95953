use crate::action::ActionKind;
use crate::action::Action;
use color_eyre::Result;

/// Base trait for page components
///
/// Components react to user actions and render their own subtree of the page.
pub trait Component {
    /// Handle an action
    ///
    /// Returns Ok(true) if the action was handled and consumed.
    /// Returns Ok(false) if the action was not handled and should propagate.
    /// Returns Err if handling the action resulted in an error.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Render the component's markup
    fn render(&self) -> String;

    /// Get list of actions this component supports
    fn supported_actions(&self) -> &[ActionKind];

    /// Get component name for debugging/logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock component for testing
    struct MockComponent {
        name: String,
        actions: Vec<ActionKind>,
    }

    impl MockComponent {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                actions: vec![ActionKind::Refresh, ActionKind::ClearFilters],
            }
        }
    }

    impl Component for MockComponent {
        fn handle_action(&mut self, action: Action) -> Result<bool> {
            Ok(self.supported_actions().contains(&ActionKind::from(&action)))
        }

        fn render(&self) -> String {
            format!("<div>{}</div>", self.name)
        }

        fn supported_actions(&self) -> &[ActionKind] {
            &self.actions
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn test_component_handles_supported_action() {
        let mut component = MockComponent::new("test");
        assert!(component.handle_action(Action::Refresh).unwrap());
        assert!(!component.handle_action(Action::AddFilter("name".into())).unwrap());
    }

    #[test]
    fn test_component_name_and_render() {
        let component = MockComponent::new("my_component");
        assert_eq!(component.name(), "my_component");
        assert_eq!(component.render(), "<div>my_component</div>");
    }
}
