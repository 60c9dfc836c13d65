//! Static toolbox catalog.
//!
//! Tool identifiers grouped by toolbox name, used by `//tools` and
//! `//status` to report what the agent has available. Execution lives on
//! the provider side; this table is display metadata only.

/// Tool identifiers for a toolbox name, or `None` for an unknown toolbox.
pub fn tools_for(toolbox: &str) -> Option<&'static [&'static str]> {
    match toolbox {
        "coding" => Some(&[
            "code_analyzer",
            "syntax_checker",
            "regex_helper",
            "json_formatter",
            "read_file_content",
            "write_file_content",
            "get_file_tree",
            "list_directory_contents",
            "search_files",
            "search_in_files",
            "get_file_info",
            "create_project_structure",
            "git_helper",
        ]),
        "math" => Some(&[
            "advanced_calculator",
            "solve_quadratic",
            "matrix_operations",
        ]),
        "science" => Some(&[
            "unit_converter",
            "chemistry_helper",
            "physics_calculator",
        ]),
        _ => None,
    }
}
