//! Prompt templates for the built-in agents.

use std::collections::BTreeMap;

/// System prompt for a specialist.
pub fn specialist_system(specialty: &str, focus: &str) -> String {
    format!(
        "You are a clinical {specialty} AI assistant. {focus}\n\n\
         Base every statement on the supplied document context. If the documents \
         contain no data relevant to {specialty}, say so plainly and list the \
         information that would be needed. Do not give definitive diagnoses."
    )
}

/// User prompt for a specialist.
pub fn specialist_user(user_input: &str, document_context: &str) -> String {
    format!(
        "User Question:\n{user_input}\n\n\
         Document Context (from uploaded medical files):\n{document_context}\n\n\
         Structure your response using these sections:\n\
         ## SPECIFIC FINDINGS FROM DOCUMENTS\n\
         ## CLINICAL INTERPRETATION\n\
         ## RECOMMENDATIONS\n\
         ## DATA GAPS"
    )
}

/// System prompt for the generalist.
pub const GENERALIST_SYSTEM: &str = "You are a general medical AI assistant. Help the user \
understand their medical documents and answer general health questions that do not need \
a specialist. Focus on education and explanation rather than specific medical advice, \
and suggest the appropriate specialist when a question needs specialized expertise.";

/// User prompt for the generalist.
pub fn generalist_user(user_input: &str, document_context: &str) -> String {
    format!(
        "User Question:\n{user_input}\n\n\
         Document Context (from uploaded medical files):\n{document_context}\n\n\
         Structure your response as:\n\
         1. Summary of what you found in the documents\n\
         2. General interpretation and explanation\n\
         3. Educational information about relevant health concepts\n\
         4. Suggested follow-up questions or specialist consultation"
    )
}

/// System prompt for the summarizer.
pub const SUMMARY_SYSTEM: &str = "You are a medical summarization assistant. Compile the \
insights of several clinical specialists into one coherent, patient-friendly report. \
Use a professional but accessible tone, organize findings by specialty and point out \
cross-specialty correlations.";

/// User prompt for the summarizer.
pub fn summary_user(labelled_outputs: &str, user_input: &str) -> String {
    format!(
        "Specialist Inputs:\n{labelled_outputs}\n\n\
         User's Original Question:\n{user_input}\n\n\
         Output Format:\n\
         ## EXECUTIVE SUMMARY\n\
         ## FINDINGS BY SPECIALTY\n\
         ## CROSS-SPECIALTY CORRELATIONS\n\
         ## PRIORITY RECOMMENDATIONS\n\
         ## QUESTIONS FOR YOUR HEALTHCARE PROVIDER\n\n\
         Note that the summary is based on the uploaded documents and is not a \
         substitute for a healthcare provider."
    )
}

/// Display label for an agent name.
///
/// `CardiologistAgent` becomes `Cardiology`; names without the `-ologist`
/// shape only lose the `Agent` suffix.
pub fn specialty_label(agent_name: &str) -> String {
    let base = agent_name.strip_suffix("Agent").unwrap_or(agent_name);
    match base.strip_suffix("ologist") {
        Some(stem) => format!("{stem}ology"),
        None => base.to_string(),
    }
}

/// `[Label]\noutput` blocks in map order, separated by blank lines.
pub fn label_outputs(outputs: &BTreeMap<String, String>) -> String {
    outputs
        .iter()
        .map(|(name, output)| format!("[{}]\n{}", specialty_label(name), output.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialty_label() {
        assert_eq!(specialty_label("CardiologistAgent"), "Cardiology");
        assert_eq!(specialty_label("GastroenterologistAgent"), "Gastroenterology");
        assert_eq!(specialty_label("GeneralistAgent"), "Generalist");
        assert_eq!(specialty_label("Gastro"), "Gastro");
    }

    #[test]
    fn test_label_outputs() {
        let mut outputs = BTreeMap::new();
        outputs.insert("NephrologistAgent".to_string(), "GFR is 92.\n".to_string());
        outputs.insert("CardiologistAgent".to_string(), "BP is fine.".to_string());

        assert_eq!(
            label_outputs(&outputs),
            "[Cardiology]\nBP is fine.\n\n[Nephrology]\nGFR is 92."
        );
    }

    #[test]
    fn test_prompts_embed_inputs() {
        let prompt = specialist_user("Is my LDL high?", "LDL 160 mg/dL");
        assert!(prompt.contains("Is my LDL high?"));
        assert!(prompt.contains("LDL 160 mg/dL"));
        assert!(specialist_system("cardiology", "").contains("cardiology"));
    }
}
