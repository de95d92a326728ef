//! Query documentation for DBAs.
//!
//! Renders, for every collector, the measurements it feeds followed by its
//! query, then a consolidated `/* ... */` catalog of every exported series.
//! Pure formatting over a [`CollectorRegistry`]; no database is needed.

use crate::collector::CollectorRegistry;

/// Full documentation: query blocks followed by the series catalog.
pub fn render_documentation(registry: &CollectorRegistry) -> String {
    let mut out = render_queries(registry);
    out.push_str(&render_series_catalog(registry));
    out
}

/// One block per collector: `-- name help` lines, the query, a blank line.
pub fn render_queries(registry: &CollectorRegistry) -> String {
    let mut out = String::new();
    for collector in registry.list() {
        for descriptor in collector.descriptors() {
            out.push_str(&format!("-- {} {}\n", descriptor.name, descriptor.help));
        }
        out.push_str(collector.query());
        out.push_str(";\n\n");
    }
    out
}

/// Every series with its label dimensions, wrapped in a SQL comment.
pub fn render_series_catalog(registry: &CollectorRegistry) -> String {
    let mut out = String::from("/*\n");
    for collector in registry.list() {
        for descriptor in collector.descriptors() {
            out.push_str(&format!("*  {} {}\n", descriptor.signature(), descriptor.help));
        }
    }
    out.push_str("*/\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::Exposition;

    fn registry() -> CollectorRegistry {
        let mut sink = Exposition::new();
        CollectorRegistry::new(&mut sink).unwrap()
    }

    #[test]
    fn test_one_query_block_per_collector() {
        let registry = registry();
        let queries = render_queries(&registry);

        assert_eq!(queries.matches(";\n\n").count(), registry.len());
        for collector in registry.list() {
            assert!(queries.contains(collector.query()), "{}", collector.name());
        }
        assert!(queries.starts_with(
            "-- mssql_instance_local_time Number of seconds since epoch on local instance\n\
             SELECT DATEDIFF(second, '19700101', GETUTCDATE());\n"
        ));
    }

    #[test]
    fn test_catalog_lists_every_series() {
        let registry = registry();
        let catalog = render_series_catalog(&registry);
        let lines: Vec<_> = catalog.lines().filter(|l| l.starts_with("*  ")).collect();

        assert_eq!(lines.len(), registry.measurement_count());
        assert_eq!(lines.len(), 20);
        assert!(catalog.starts_with("/*\n"));
        assert!(catalog.ends_with("*/\n"));
        assert!(lines.contains(&"*  mssql_connections{database,state} Number of active connections"));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("*  mssql_database_filesize{database,logicalname,type,filename} "))
        );
        assert!(lines.contains(&"*  mssql_cpu_idle_percentage Percentage of CPU idle"));
        assert!(!catalog.contains("UP Status"));
    }

    #[test]
    fn test_documentation_is_queries_then_catalog() {
        let registry = registry();
        let doc = render_documentation(&registry);
        let catalog_at = doc.find("/*\n").unwrap();
        assert!(doc[..catalog_at].contains("-- mssql_io_stall "));
        assert!(doc[catalog_at..].contains("*  mssql_io_stall_total{database} "));
    }
}
