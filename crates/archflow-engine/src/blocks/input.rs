use archflow_config::InputConfig;

use crate::result::BlockOutput;

/// Emit the configured content. Upstream inputs are ignored.
pub fn run(config: &InputConfig) -> BlockOutput {
  BlockOutput::Input {
    content: config.content.clone(),
  }
}
