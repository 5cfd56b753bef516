use async_trait::async_trait;
use tessera_core::kernel::context::RenderContext;
use tessera_core::kernel::error::Result;
use tessera_core::kernel::RenderAdapter;

/// Text rendering of a component tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOutput {
    pub lines: Vec<String>,
}

impl ConsoleOutput {
    pub fn outline(&self) -> String {
        self.lines.iter().map(|line| format!("{}\n", line)).collect()
    }
}

/// Render adapter for the command line.
///
/// Produces one line per component, indented by depth, e.g.
/// `  Button#save {"text":"Save"}`.
#[derive(Debug, Default)]
pub struct ConsoleAdapter;

#[async_trait]
impl RenderAdapter for ConsoleAdapter {
    type Output = ConsoleOutput;

    async fn render(&self, context: RenderContext) -> Result<ConsoleOutput> {
        let tree = context.component_tree();
        log::debug!("Rendering {} components to the console", tree.node_count());

        let mut lines = Vec::with_capacity(tree.node_count());
        tree.walk(|node, depth| {
            let mut line = format!("{}{}", "  ".repeat(depth), node.component_name);
            if let Some(id) = &node.id {
                line.push('#');
                line.push_str(id);
            }
            if !node.props.is_empty() {
                line.push(' ');
                line.push_str(&serde_json::Value::Object(node.props.clone()).to_string());
            }
            lines.push(line);
        });
        Ok(ConsoleOutput { lines })
    }
}
