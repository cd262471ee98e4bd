//! Object numbering for the one-image-per-page document layout.
//!
//! ```text
//! 1           Catalog
//! 2           Pages
//! 3 + 3i      Image XObject of page i
//! 3 + 3i + 1  Content stream of page i
//! 3 + 3i + 2  Page object of page i
//! ```
//!
//! Later objects reference earlier ones by number, so every id in the
//! document comes from [`object_id_for`].

/// Object number of the document catalog.
pub const CATALOG_ID: usize = 1;

/// Object number of the page tree root.
pub const PAGES_ID: usize = 2;

const FIRST_PAGE_OBJECT: usize = 3;
const OBJECTS_PER_PAGE: usize = 3;

/// Which of a page's three objects an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRole {
    /// The page's image XObject.
    Image,
    /// The content stream that paints the image.
    Content,
    /// The page dictionary.
    Page,
}

impl ObjectRole {
    fn offset(self) -> usize {
        match self {
            ObjectRole::Image => 0,
            ObjectRole::Content => 1,
            ObjectRole::Page => 2,
        }
    }
}

/// Object number for `role` on the 0-indexed page `page_index`.
pub fn object_id_for(page_index: usize, role: ObjectRole) -> usize {
    FIRST_PAGE_OBJECT + page_index * OBJECTS_PER_PAGE + role.offset()
}

/// Highest object number in a document of `page_count` pages.
pub fn highest_object_id(page_count: usize) -> usize {
    PAGES_ID + page_count * OBJECTS_PER_PAGE
}

/// Resource name under which page `page_index` refers to its image.
pub fn image_resource_name(page_index: usize) -> String {
    format!("Im{}", page_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_follows_catalog_and_pages() {
        assert_eq!(object_id_for(0, ObjectRole::Image), 3);
        assert_eq!(object_id_for(0, ObjectRole::Content), 4);
        assert_eq!(object_id_for(0, ObjectRole::Page), 5);
    }

    #[test]
    fn each_page_takes_three_ids() {
        assert_eq!(object_id_for(1, ObjectRole::Image), 6);
        assert_eq!(object_id_for(4, ObjectRole::Page), 3 + 4 * 3 + 2);
    }

    #[test]
    fn ids_are_dense_and_unique() {
        let pages = 5;
        let mut ids: Vec<usize> = vec![CATALOG_ID, PAGES_ID];
        for i in 0..pages {
            for role in [ObjectRole::Image, ObjectRole::Content, ObjectRole::Page] {
                ids.push(object_id_for(i, role));
            }
        }
        let expected: Vec<usize> = (1..=highest_object_id(pages)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn resource_names_are_per_page() {
        assert_eq!(image_resource_name(0), "Im0");
        assert_eq!(image_resource_name(12), "Im12");
    }
}
