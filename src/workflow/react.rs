//! 解析推理服务的单轮输出
//!
//! 模型按 Thought / Action / Action Input / Final Answer 格式输出，
//! 这里把自由文本规范化成 [`Directive`]

use regex::Regex;
use std::sync::LazyLock;

use crate::services::prompt::FINAL_ANSWER_MARKER;

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern")
});

/// 行首的 Observation，模型替工具续写的结果从这里开始
static LINE_OBSERVATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*Observation\s*:").expect("observation pattern"));

/// 单轮输出的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// 终止决定，`text` 为本轮完整输出
    Final { text: String },
    /// 工具调用
    Tool {
        name: String,
        input: String,
        /// 本轮输出（截掉模型自己编造的 Observation 之后）
        log: String,
    },
    /// 格式不合法
    Malformed { log: String, reason: String },
}

/// 解析单轮输出
pub fn parse_turn(output: &str) -> Directive {
    let log = clean_log(output);

    let final_pos = log.find(FINAL_ANSWER_MARKER);
    let action = ACTION.captures(&log).and_then(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        let input = caps.get(2)?.as_str();
        Some((whole.start(), clean_tool_name(name), clean_tool_input(input)))
    });

    match (final_pos, action) {
        (Some(final_at), Some((action_at, _, _))) if final_at < action_at => Directive::Final { text: log },
        (Some(_), None) => Directive::Final { text: log },
        (_, Some((_, name, _))) if name.is_empty() => Directive::Malformed {
            log,
            reason: "Missing tool name after 'Action:'".to_string(),
        },
        (_, Some((_, name, input))) => Directive::Tool { name, input, log },
        (None, None) => {
            let reason = if log.contains("Action:") {
                "Missing 'Action Input:' after 'Action:'"
            } else {
                "Missing 'Action:' after 'Thought:'"
            };
            Directive::Malformed {
                log,
                reason: reason.to_string(),
            }
        }
    }
}

/// 去掉模型自己续写的 Observation 以及开头重复的 "Thought:"
///
/// 只在行首的 Observation 处截断，且它之前必须已有工具调用、没有终止标记；
/// 行内提到的 Observation 不算
fn clean_log(output: &str) -> String {
    let output = match hallucinated_observation(output) {
        Some(pos) => &output[..pos],
        None => output,
    };
    let output = output.trim();
    output
        .strip_prefix("Thought:")
        .unwrap_or(output)
        .trim()
        .to_string()
}

fn hallucinated_observation(output: &str) -> Option<usize> {
    let pos = LINE_OBSERVATION.find(output)?.start();
    let before = &output[..pos];
    let action_at = ACTION.find(before)?.start();
    match before.find(FINAL_ANSWER_MARKER) {
        Some(final_at) if final_at < action_at => None,
        _ => Some(pos),
    }
}

fn clean_tool_name(name: &str) -> String {
    name.trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c == '[' || c == ']' || c == '*')
        .trim()
        .to_string()
}

fn clean_tool_input(input: &str) -> String {
    let input = input.trim();
    let input = input
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(input);
    input.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_call() {
        let output = " The options are CPT codes.\nAction: lookup_codes_local\nAction Input: 41110\n41105\n41113\n40800";
        match parse_turn(output) {
            Directive::Tool { name, input, log } => {
                assert_eq!(name, "lookup_codes_local");
                assert_eq!(input, "41110\n41105\n41113\n40800");
                assert!(log.starts_with("The options are CPT codes."));
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn test_hallucinated_observation_is_cut() {
        let output = "Action: web_search_missing_codes\nAction Input: M17.0\nM17.1\nObservation: M17.0 - made up\nThought: I now know\nFinal Answer: A";
        match parse_turn(output) {
            Directive::Tool { name, input, log } => {
                assert_eq!(name, "web_search_missing_codes");
                assert_eq!(input, "M17.0\nM17.1");
                assert!(!log.contains("made up"));
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn test_parse_final_answer() {
        let output = "Thought: I now know the final answer\nFinal Answer: B";
        assert_eq!(
            parse_turn(output),
            Directive::Final {
                text: "I now know the final answer\nFinal Answer: B".to_string()
            }
        );
    }

    #[test]
    fn test_final_before_action_wins() {
        let output = "Final Answer: C\nAction: lookup_codes_local\nAction Input: 41110";
        assert!(matches!(parse_turn(output), Directive::Final { .. }));
    }

    #[test]
    fn test_tool_name_decorations_removed() {
        let output = "Action: `lookup_codes_local`\nAction Input: \"41110\"";
        match parse_turn(output) {
            Directive::Tool { name, input, .. } => {
                assert_eq!(name, "lookup_codes_local");
                assert_eq!(input, "41110");
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_output() {
        match parse_turn("I think the answer might be B") {
            Directive::Malformed { reason, .. } => assert!(reason.contains("Missing 'Action:'")),
            other => panic!("unexpected directive: {other:?}"),
        }
        match parse_turn("Action: lookup_codes_local") {
            Directive::Malformed { reason, .. } => assert!(reason.contains("Action Input")),
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn test_inline_observation_keeps_final_answer() {
        let output = "Per the Observation: 41105 - Biopsy of tongue matches the procedure.\nThought: I now know the final answer\nFinal Answer: B";
        match parse_turn(output) {
            Directive::Final { text } => {
                assert!(text.starts_with("Per the Observation: 41105"));
                assert!(text.ends_with("Final Answer: B"));
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn test_line_observation_without_action_is_kept() {
        let output = "Looking back at the lookup.\nObservation: 41105 - Biopsy of tongue\nFinal Answer: B";
        assert!(matches!(parse_turn(output), Directive::Final { .. }));
    }
}
