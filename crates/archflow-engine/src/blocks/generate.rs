use archflow_config::GenerateConfig;
use archflow_services::{GenerateRequest, ModelService, estimate_tokens};
use tracing::warn;

use crate::input::NodeInputs;
use crate::result::BlockOutput;

/// The user prompt followed by each input's text, separated by blank lines.
pub fn compose_prompt(user_prompt: &str, inputs: &NodeInputs) -> String {
  let mut prompt = user_prompt.to_string();
  for text in inputs.texts() {
    prompt.push_str("\n\n");
    prompt.push_str(text);
  }
  prompt
}

/// Call the model with the composed prompt.
///
/// A failed call does not fail the node: the output carries a placeholder
/// response and is marked `degraded`.
pub async fn run(
  model: &dyn ModelService,
  config: &GenerateConfig,
  inputs: &NodeInputs,
) -> BlockOutput {
  let prompt = compose_prompt(&config.user_prompt, inputs);
  let request = GenerateRequest {
    model: config.model_id.clone(),
    system_prompt: config.system_prompt.clone(),
    prompt,
    temperature: config.temperature,
    max_tokens: config.max_tokens,
  };

  match model.generate(&request).await {
    Ok(completion) => BlockOutput::Generate {
      model: request.model,
      prompt: request.prompt,
      response: completion.text,
      input_tokens: completion.input_tokens,
      output_tokens: completion.output_tokens,
      degraded: false,
    },
    Err(e) => {
      warn!(model = %request.model, error = %e, "model_call_failed");
      let response = format!(
        "[{} unavailable] No generated response. Prompt was: {}",
        request.model, request.prompt
      );
      BlockOutput::Generate {
        input_tokens: estimate_tokens(&request.system_prompt) + estimate_tokens(&request.prompt),
        output_tokens: 0,
        model: request.model,
        prompt: request.prompt,
        response,
        degraded: true,
      }
    }
  }
}
