/// Short, human-readable name of a stage type for log lines.
///
/// Given `"stockcast_pipeline::components::Foo<alloc::string::String>"`,
/// returns `"Foo"`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_module_path() {
        assert_eq!(short_type_name("a::b::TopNSelector"), "TopNSelector");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn strips_generic_arguments() {
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
    }
}
