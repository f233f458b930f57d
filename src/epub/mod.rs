/*!
 * EPUB reading and writing.
 *
 * - `container`: the in-memory ZIP package
 * - `opf`: container.xml, manifest and metadata
 * - `xhtml`: the text walk over content documents
 * - `markup`: shared XML helpers
 */

pub mod container;
pub mod markup;
pub mod opf;
pub mod xhtml;

pub use self::container::{EpubPackage, PackageEntry};
pub use self::opf::{ManifestItem, Metadata, MetadataUpdate};
pub use self::xhtml::{TextSlot, XhtmlDocument};
