//! Prompt templates for analyst answers and company discovery.
//!
//! Domain logic for rendering the instructions sent through the gateway.
//! Provider-agnostic, pure and deterministic.

// =============================================================================
// Templates
// =============================================================================

const ANALYST_TEMPLATE: &str = "\
Act as a financial analyst for an investment banking firm. \
Be concise and provide only the information needed. \
Evaluate the company {company} by answering the following question: {question}. \
If the output is a link, name, numerical figure or contact that needs no textual \
description, provide ONLY that output and nothing else. \
Limit the output to less than 80 words, no more than this.";

const REFERENCE_CLAUSE: &str = " Incorporate this data as a reference: {reference}";

const DISCOVERY_TEMPLATE: &str = "\
Your task is to conduct deep research to identify {number} companies or investors \
that would be willing to invest in {seed}. \
Search for companies that have recently acquired or invested in businesses like this \
one, focusing on recent transactions, and include companies from adjacent industries \
that have traction with this space or have expanded toward it. \
Check recent management presentations and earnings call transcripts, and look for \
keywords such as M&A, investment, or deal. \
Output should ONLY be the names of the companies, separated with a comma. \
Do not output anything else.";

// =============================================================================
// Composition
// =============================================================================

/// Render the full analyst instruction for one (company, question) pair.
///
/// `reference` is opaque text from the private-data collaborator; a found
/// record and a not-found marker are interpolated the same way.
pub fn compose_analyst(company: &str, question: &str, reference: Option<&str>) -> String {
    let mut prompt = ANALYST_TEMPLATE
        .replace("{company}", company)
        .replace("{question}", question);
    if let Some(data) = reference {
        prompt.push_str(&REFERENCE_CLAUSE.replace("{reference}", data));
    }
    prompt
}

/// Render the company-discovery instruction.
///
/// The reply contract is a bare comma-separated name list; see
/// [`parse_discovery_reply`] for the inverse.
pub fn compose_discovery(seed: &str, number: usize) -> String {
    DISCOVERY_TEMPLATE
        .replace("{number}", &number.to_string())
        .replace("{seed}", seed)
}

/// Split a discovery reply into company names: comma-separated, each entry
/// trimmed, empty fragments dropped.
pub fn parse_discovery_reply(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
