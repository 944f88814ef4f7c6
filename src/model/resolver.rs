//! Simple-name type resolution against the filesystem.
//!
//! Resolution assumes a one-class-per-file, directory-mirrors-package layout
//! and probes real files. A name that no probe matches is returned bare; an
//! unresolved name is a normal outcome, not an error.

use jnigen_signatures::{BasicType, Type};
use std::path::{Path, PathBuf};

/// The resolution context of one declaring class.
pub struct Resolver<'a> {
    simple_name: &'a str,
    package: &'a str,
    source_path: &'a Path,
    imports: &'a [String],
}

impl<'a> Resolver<'a> {
    pub fn new(
        simple_name: &'a str,
        package: &'a str,
        source_path: &'a Path,
        imports: &'a [String],
    ) -> Self {
        Resolver { simple_name, package, source_path, imports }
    }

    /// The source root: the file's directory with the package directories
    /// stripped back off.
    pub fn source_root(&self) -> PathBuf {
        let mut root = self.source_path.parent().unwrap_or(Path::new("")).to_owned();
        if !self.package.is_empty() {
            for _ in self.package.split('.') {
                root = root.parent().unwrap_or(Path::new("")).to_owned();
            }
        }
        root
    }

    /// Probes for the source file declaring `simple`, or `None`.
    pub fn find_path(&self, simple: &str) -> Option<PathBuf> {
        if simple == self.simple_name {
            return Some(self.source_path.to_owned());
        }
        let sibling = self
            .source_path
            .parent()
            .unwrap_or(Path::new(""))
            .join(format!("{simple}.java"));
        if sibling.exists() {
            return Some(sibling);
        }
        let root = self.source_root();
        for import in self.imports {
            let mut candidate = root.clone();
            for component in import.split('.') {
                candidate.push(component);
            }
            candidate.push(format!("{simple}.java"));
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }

    /// Resolves a simple name to a fully-qualified name, degrading to the
    /// bare name when nothing matches.
    pub fn resolve(&self, simple: &str) -> String {
        let qualify = |package: &str| {
            if package.is_empty() {
                simple.to_owned()
            } else {
                format!("{package}.{simple}")
            }
        };
        if simple == self.simple_name {
            return qualify(self.package);
        }
        let sibling = self
            .source_path
            .parent()
            .unwrap_or(Path::new(""))
            .join(format!("{simple}.java"));
        if sibling.exists() {
            return qualify(self.package);
        }
        let root = self.source_root();
        for import in self.imports {
            let mut candidate = root.clone();
            for component in import.split('.') {
                candidate.push(component);
            }
            candidate.push(format!("{simple}.java"));
            if candidate.exists() {
                return qualify(import);
            }
        }
        simple.to_owned()
    }

    /// Maps a Java type spelling (base name plus array dimensions) to a typed
    /// signature. Primitives and the fixed JDK types map directly; dotted
    /// names are taken verbatim; anything else goes through [`Self::resolve`].
    pub fn resolve_type(&self, base: &str, dims: usize) -> Type {
        let ty = if let Some(basic) = BasicType::from_java_name(base) {
            Type::new(basic)
        } else {
            match base {
                "String" | "Class" | "Object" => {
                    Type::class(vec!["java".to_owned(), "lang".to_owned()], base)
                }
                _ if base.contains('.') => Type::class_fqn(base),
                _ => {
                    let resolved = self.resolve(base);
                    if resolved.contains('.') {
                        Type::class_fqn(&resolved)
                    } else {
                        Type::class(Vec::new(), resolved)
                    }
                }
            }
        };
        ty.array_dim(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_and_jdk_mapping() {
        let imports: Vec<String> = Vec::new();
        let r = Resolver::new("Test", "", Path::new("Test.java"), &imports);
        assert_eq!(r.resolve_type("int", 0).display_jni().to_string(), "I");
        assert_eq!(r.resolve_type("boolean", 2).display_jni().to_string(), "[[Z");
        assert_eq!(
            r.resolve_type("String", 0).display_jni().to_string(),
            "Ljava/lang/String;"
        );
        assert_eq!(
            r.resolve_type("Class", 0).display_jni().to_string(),
            "Ljava/lang/Class;"
        );
        assert_eq!(
            r.resolve_type("com.example.Foo", 0).display_jni().to_string(),
            "Lcom/example/Foo;"
        );
    }

    #[test]
    fn sibling_file_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("bar");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("Foo.java"), "public class Foo {}\n").unwrap();
        let main = pkg.join("Main.java");
        std::fs::write(&main, "public class Main {}\n").unwrap();

        let imports: Vec<String> = Vec::new();
        let r = Resolver::new("Main", "bar", &main, &imports);
        assert_eq!(r.resolve("Foo"), "bar.Foo");
        assert_eq!(r.find_path("Foo"), Some(pkg.join("Foo.java")));
        assert_eq!(r.resolve_type("Foo", 0).display_jni().to_string(), "Lbar/Foo;");
    }

    #[test]
    fn import_resolution_in_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("Foo.java"), "").unwrap();
        std::fs::write(b.join("Foo.java"), "").unwrap();
        let main = dir.path().join("pkg").join("Main.java");
        std::fs::create_dir_all(main.parent().unwrap()).unwrap();
        std::fs::write(&main, "").unwrap();

        let imports = vec!["b".to_owned(), "a".to_owned()];
        let r = Resolver::new("Main", "pkg", &main, &imports);
        assert_eq!(r.resolve("Foo"), "b.Foo");
    }

    #[test]
    fn self_reference_short_circuit() {
        let imports: Vec<String> = Vec::new();
        let r = Resolver::new("OS", "org.example", Path::new("/src/org/example/OS.java"), &imports);
        assert_eq!(r.resolve("OS"), "org.example.OS");
        assert_eq!(r.find_path("OS"), Some(PathBuf::from("/src/org/example/OS.java")));
    }

    #[test]
    fn unresolved_name_degrades_to_bare() {
        let imports: Vec<String> = Vec::new();
        let r = Resolver::new("Test", "", Path::new("Test.java"), &imports);
        assert_eq!(r.resolve("Mystery"), "Mystery");
        assert_eq!(r.resolve_type("Mystery", 0).display_jni().to_string(), "LMystery;");
        assert_eq!(r.find_path("Mystery"), None);
    }
}
