//! Standard task kinds.
//!
//! | Kind | Folder | File |
//! |------|--------|------|
//! | `class` | classes | `Foo_Bar` → `Foo/Bar.php` |
//! | `clone` | classes | as class |
//! | `controller` | classes | `Welcome` → `Controller/Welcome.php` |
//! | `unittest` | tests | `Foo_Bar` → `Foo/BarTest.php` |
//! | `file` | classes | name used verbatim |
//! | `config` / `message` | config / messages | `name.php` |

mod class;
mod clone;
mod controller;
mod file;
mod unittest;
mod values;

pub use class::ClassKind;
pub use clone::CloneKind;
pub use controller::ControllerKind;
pub use file::FileKind;
pub use unittest::UnittestKind;
pub use values::ValuesKind;
