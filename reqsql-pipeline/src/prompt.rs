//! Prompt templates for the two language-model stages

use reqsql_core::schema;

/// Prompt asking for a JSON array of use cases derived from `requirements`
pub fn use_case_prompt(requirements: &str) -> String {
    format!(
        r#"Analyze the following software requirements document. Your task is to identify key functionalities, data entities, and relationships that need to be tested from a database perspective. Based on this analysis, generate a list of distinct, high-level use cases or questions that describe what to test in the database.

Focus on aspects such as data integrity, correctness of calculations, relationships between entities, and coverage of core features mentioned. Do not generate SQL queries, only natural language use cases.

Output Instructions:

Output must be a valid JSON array of strings.

Each string should be a use case or test scenario, as in the sample below.

Do not include any explanations, formatting, or text outside the JSON array.

Output must match the following format exactly (replace the sample use cases with your own based on the analysis):
[
    "Verify the accuracy of total premium calculation for each policy.",
    "Check for data consistency between the claims table and the policies table via policy IDs.",
    "Validate that every claim payment references an existing claim."
]
Remember: Output only a valid JSON array of strings, nothing else.

Requirements Document:
---BEGIN DOCUMENT---
{requirements}
---END DOCUMENT---

JSON List of Use Cases:"#
    )
}

/// Prompt asking for exactly one query that tests `use_case`
///
/// `dialect` names the SQL dialect of the warehouse the query will run on.
pub fn query_prompt(use_case: &str, dialect: &str) -> String {
    format!(
        "Based on the provided P&C Insurance database schema, generate a specific SQL query to test the following use case: {use_case}. \
         Ensure the query is valid for {dialect} execution with no syntax error. \
         Output should only contain the SQL query, nothing else.\n\n\
         Schema:\n{model}",
        model = schema::semantic_model()
    )
}
