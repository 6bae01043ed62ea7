//! Baseline addressing: URL path to filesystem-safe identifier

use crate::page::PageGroup;

/// Normalize a URL path into a baseline filename stem.
///
/// Strips one leading and one trailing slash, turns internal slashes
/// into hyphens, and drops anything outside `[A-Za-z0-9-]`. An empty
/// result (the site root) becomes `"home"`. Pure and idempotent:
/// `slugify(slugify(p)) == slugify(p)`.
pub fn slugify(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let slug: String = trimmed
        .chars()
        .map(|c| if c == '/' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if slug.is_empty() {
        "home".to_string()
    } else {
        slug
    }
}

/// Relative baseline-image path for a page:
/// `{group_dir}/{slug}.png`, e.g. `woo/shop.png`.
pub fn baseline_image(group: PageGroup, path: &str) -> String {
    format!("{}/{}.png", group.baseline_dir(), slugify(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/", "home"; "root")]
    #[test_case("", "home"; "empty")]
    #[test_case("/about/", "about"; "simple page")]
    #[test_case("/about", "about"; "no trailing slash")]
    #[test_case("/product/example-product/", "product-example-product"; "nested path")]
    #[test_case("/my-account-2/", "my-account-2"; "digits kept")]
    #[test_case("/shop/?orderby=price", "shoporderbyprice"; "query chars dropped")]
    #[test_case("/caf\u{e9}/", "caf"; "non ascii dropped")]
    fn slugify_cases(path: &str, expected: &str) {
        assert_eq!(slugify(path), expected);
    }

    #[test]
    fn slugify_is_idempotent() {
        for path in ["/", "", "/about/", "/product/example-product/", "/shop/?x=1"] {
            let once = slugify(path);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", path);
        }
    }

    #[test]
    fn slug_charset_and_edges() {
        for path in ["/a b c/", "/x/y/z/", "/trailing///", "/-dash-/"] {
            let slug = slugify(path);
            assert!(
                slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
                "bad char in {:?}",
                slug
            );
            // A single leading/trailing slash never produces a hyphen
            // at the edges; "/x/" maps to "x", not "-x-".
            assert_eq!(slugify("/x/"), "x");
        }
    }

    #[test]
    fn baseline_paths_use_group_dirs() {
        assert_eq!(baseline_image(PageGroup::Woo, "/shop/"), "woo/shop.png");
        assert_eq!(baseline_image(PageGroup::Static, "/"), "static/home.png");
        assert_eq!(
            baseline_image(PageGroup::Product, "/product/example-product/"),
            "products/product-example-product.png"
        );
    }
}
