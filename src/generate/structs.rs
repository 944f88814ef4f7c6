//! The structs generator: field-ID caches and `get/setXFields` accessor
//! pairs copying between JNI objects and native structs.

use crate::{
    app::{GenConfig, Progress},
    generate::{env_call, Output},
    meta::{Flag, SharedMetaData},
    model::{is_instance_field, is_struct_class, ClassRef, FieldRef, JniClass},
};
use jnigen_signatures::Type;

pub fn generate_header(
    config: &GenConfig,
    store: &SharedMetaData,
    classes: &[ClassRef],
    progress: &mut dyn Progress,
) -> String {
    let mut out = Output::with_header(store);
    out.line(&format!("#include \"{}.h\"", config.platform));
    for class in classes {
        let simple = class.simple_name();
        progress.step(&simple);
        let exclude = class.meta().exclude();
        out.blank();
        if !exclude.is_empty() {
            out.line(&exclude);
        }
        out.line(&format!("#ifndef NO_{simple}"));
        out.line(&format!("void cache{simple}Fields(JNIEnv *env, jobject lpObject);"));
        out.line(&format!(
            "{simple} *get{simple}Fields(JNIEnv *env, jobject lpObject, {simple} *lpStruct);"
        ));
        out.line(&format!(
            "void set{simple}Fields(JNIEnv *env, jobject lpObject, {simple} *lpStruct);"
        ));
        out.line(&format!("#define {simple}_sizeof() sizeof({simple})"));
        out.line("#else");
        out.line(&format!("#define cache{simple}Fields(a,b)"));
        out.line(&format!("#define get{simple}Fields(a,b,c) NULL"));
        out.line(&format!("#define set{simple}Fields(a,b,c)"));
        out.line(&format!("#define {simple}_sizeof() 0"));
        out.line("#endif");
        if !exclude.is_empty() {
            out.line("#endif");
        }
    }
    out.into_string()
}

pub fn generate_source(
    config: &GenConfig,
    store: &SharedMetaData,
    classes: &[ClassRef],
    progress: &mut dyn Progress,
) -> String {
    let mut out = Output::with_header(store);
    out.line(&format!("#include \"{}_structs.h\"", config.platform));
    let mut gen = StructsGenerator { config, out };
    for class in classes {
        progress.step(&class.simple_name());
        gen.generate_class(class.as_ref());
    }
    gen.out.into_string()
}

struct StructsGenerator<'a> {
    config: &'a GenConfig,
    out: Output,
}

impl StructsGenerator<'_> {
    fn generate_class(&mut self, class: &dyn JniClass) {
        let simple = class.simple_name();
        let fields: Vec<FieldRef> = class
            .fields()
            .into_iter()
            .filter(|f| is_instance_field(f.as_ref()))
            .collect();
        let superclass = class
            .superclass()
            .filter(|sup| is_struct_class(sup.as_ref()))
            .map(|sup| sup.simple_name());
        let exclude = class.meta().exclude();

        self.out.blank();
        if !exclude.is_empty() {
            self.out.line(&exclude);
        }
        self.out.line(&format!("#ifndef NO_{simple}"));
        self.generate_cache(&simple, &fields, superclass.as_deref());
        self.generate_get(&simple, &fields, superclass.as_deref());
        self.generate_set(&simple, &fields, superclass.as_deref());
        self.out.line("#endif");
        if !exclude.is_empty() {
            self.out.line("#endif");
        }
    }

    fn generate_cache(
        &mut self,
        simple: &str,
        fields: &[FieldRef],
        superclass: Option<&str>,
    ) {
        let mode = self.config.bit_mode;
        self.out.line(&format!("typedef struct {simple}_FID_CACHE {{"));
        self.out.line("\tint cached;");
        self.out.line("\tjclass clazz;");
        if !fields.is_empty() {
            let names: Vec<String> = fields.iter().map(|f| f.name()).collect();
            self.out.line(&format!("\tjfieldID {};", names.join(", ")));
        }
        self.out.line(&format!("}} {simple}_FID_CACHE;"));
        self.out.blank();
        self.out.line(&format!("{simple}_FID_CACHE {simple}Fc;"));
        self.out.blank();
        self.out
            .line(&format!("void cache{simple}Fields(JNIEnv *env, jobject lpObject)"));
        self.out.line("{");
        self.out.line(&format!("\tif ({simple}Fc.cached) return;"));
        if let Some(sup) = superclass {
            self.out.line(&format!("\tcache{sup}Fields(env, lpObject);"));
        }
        self.out.line(&format!(
            "\t{simple}Fc.clazz = {};",
            env_call(self.config.cpp, "GetObjectClass", &["lpObject"])
        ));
        for field in fields {
            let name = field.name();
            let descriptor = field.ty(mode).display_jni().to_string();
            self.field_lines(field, &[format!(
                "\t{simple}Fc.{name} = {};",
                env_call(
                    self.config.cpp,
                    "GetFieldID",
                    &[
                        &format!("{simple}Fc.clazz"),
                        &format!("\"{name}\""),
                        &format!("\"{descriptor}\""),
                    ]
                )
            )]);
        }
        self.out.line(&format!("\t{simple}Fc.cached = 1;"));
        self.out.line("}");
        self.out.blank();
    }

    fn generate_get(&mut self, simple: &str, fields: &[FieldRef], superclass: Option<&str>) {
        let mode = self.config.bit_mode;
        self.out.line(&format!(
            "{simple} *get{simple}Fields(JNIEnv *env, jobject lpObject, {simple} *lpStruct)"
        ));
        self.out.line("{");
        self.out
            .line(&format!("\tif (!{simple}Fc.cached) cache{simple}Fields(env, lpObject);"));
        if let Some(sup) = superclass {
            self.out
                .line(&format!("\tget{sup}Fields(env, lpObject, ({sup} *)lpStruct);"));
        }
        for field in fields {
            let name = field.name();
            let ty = field.ty(mode);
            let cpp = self.config.cpp;
            let fid = format!("{simple}Fc.{name}");
            let lines = if ty.is_primitive() {
                let cast = field.meta().cast();
                vec![format!(
                    "\tlpStruct->{name} = {cast}{};",
                    env_call(cpp, &format!("Get{}Field", ty.jni_accessor()), &["lpObject", &fid])
                )]
            } else if ty.is_primitive_array() {
                let component = ty.component();
                let jtype = component.c_type();
                vec![
                    "\t{".to_owned(),
                    format!(
                        "\t{jtype}Array lpObject1 = ({jtype}Array){};",
                        env_call(cpp, "GetObjectField", &["lpObject", &fid])
                    ),
                    format!(
                        "\t{};",
                        env_call(
                            cpp,
                            &format!("Get{}ArrayRegion", component.jni_accessor()),
                            &[
                                "lpObject1",
                                "0",
                                &region_length(&component, &name),
                                &format!("({jtype} *)lpStruct->{name}"),
                            ]
                        )
                    ),
                    "\t}".to_owned(),
                ]
            } else if let Some(nested) = ty.simple_name().filter(|_| !ty.is_array()) {
                if ty.is_string() || ty.is_system_class() {
                    log::warn!("cannot marshal field {simple}.{name}: {}", ty.natural_name());
                    continue;
                }
                vec![
                    "\t{".to_owned(),
                    format!(
                        "\tjobject lpObject1 = {};",
                        env_call(cpp, "GetObjectField", &["lpObject", &fid])
                    ),
                    format!(
                        "\tif (lpObject1 != NULL) get{nested}Fields(env, lpObject1, &lpStruct->{name});"
                    ),
                    "\t}".to_owned(),
                ]
            } else {
                log::warn!("cannot marshal field {simple}.{name}: {}", ty.natural_name());
                continue;
            };
            self.field_lines(field, &lines);
        }
        self.out.line("\treturn lpStruct;");
        self.out.line("}");
        self.out.blank();
    }

    fn generate_set(&mut self, simple: &str, fields: &[FieldRef], superclass: Option<&str>) {
        let mode = self.config.bit_mode;
        self.out.line(&format!(
            "void set{simple}Fields(JNIEnv *env, jobject lpObject, {simple} *lpStruct)"
        ));
        self.out.line("{");
        self.out
            .line(&format!("\tif (!{simple}Fc.cached) cache{simple}Fields(env, lpObject);"));
        if let Some(sup) = superclass {
            self.out
                .line(&format!("\tset{sup}Fields(env, lpObject, ({sup} *)lpStruct);"));
        }
        for field in fields {
            let name = field.name();
            let ty = field.ty(mode);
            let cpp = self.config.cpp;
            let fid = format!("{simple}Fc.{name}");
            let lines = if ty.is_primitive() {
                vec![format!(
                    "\t{};",
                    env_call(
                        cpp,
                        &format!("Set{}Field", ty.jni_accessor()),
                        &[
                            "lpObject",
                            &fid,
                            &format!("({})lpStruct->{name}", ty.c_type()),
                        ]
                    )
                )]
            } else if ty.is_primitive_array() {
                let component = ty.component();
                let jtype = component.c_type();
                vec![
                    "\t{".to_owned(),
                    format!(
                        "\t{jtype}Array lpObject1 = ({jtype}Array){};",
                        env_call(cpp, "GetObjectField", &["lpObject", &fid])
                    ),
                    format!(
                        "\t{};",
                        env_call(
                            cpp,
                            &format!("Set{}ArrayRegion", component.jni_accessor()),
                            &[
                                "lpObject1",
                                "0",
                                &region_length(&component, &name),
                                &format!("({jtype} *)lpStruct->{name}"),
                            ]
                        )
                    ),
                    "\t}".to_owned(),
                ]
            } else if let Some(nested) = ty.simple_name().filter(|_| !ty.is_array()) {
                if ty.is_string() || ty.is_system_class() {
                    continue;
                }
                vec![
                    "\t{".to_owned(),
                    format!(
                        "\tjobject lpObject1 = {};",
                        env_call(cpp, "GetObjectField", &["lpObject", &fid])
                    ),
                    format!(
                        "\tif (lpObject1 != NULL) set{nested}Fields(env, lpObject1, &lpStruct->{name});"
                    ),
                    "\t}".to_owned(),
                ]
            } else {
                continue;
            };
            self.field_lines(field, &lines);
        }
        self.out.line("}");
        self.out.blank();
    }

    /// Emits a field's lines inside its `exclude` and `no_wince` guards.
    fn field_lines(&mut self, field: &FieldRef, lines: &[String]) {
        let exclude = field.meta().exclude();
        let wince = field.meta().has_flag(Flag::NoWinCE);
        if !exclude.is_empty() {
            self.out.line(&exclude);
        }
        if wince {
            self.out.line("#ifndef _WIN32_WCE");
        }
        for line in lines {
            self.out.line(line);
        }
        if wince {
            self.out.line("#endif");
        }
        if !exclude.is_empty() {
            self.out.line("#endif");
        }
    }
}

/// The element count handed to `Get/SetXArrayRegion`: the native field's
/// byte size scaled down by the component width.
fn region_length(component: &Type, name: &str) -> String {
    match component.byte_width() {
        0 | 1 => format!("sizeof(lpStruct->{name})"),
        width => format!("sizeof(lpStruct->{name}) / {width}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NoProgress;
    use crate::meta::{shared, MetaData};
    use crate::model::{parsed::Loader, BitMode};
    use std::path::PathBuf;

    fn config() -> GenConfig {
        GenConfig {
            main_class: PathBuf::from("Test.java"),
            platform: "test".to_owned(),
            output_dir: PathBuf::from("."),
            metadata_dir: PathBuf::from("."),
            bit_mode: BitMode::B32,
            cpp: false,
            enter_exit: true,
            embed: false,
        }
    }

    #[test]
    fn accessor_pair_and_cache() {
        let store = shared(MetaData::new());
        let class = crate::parse::parse_source(
            "RECT.java".as_ref(),
            "public class RECT {\npublic int left, top, right, bottom;\n}\n",
            store.clone(),
        )
        .unwrap();
        let classes = [class as ClassRef];
        let header = generate_header(&config(), &store, &classes, &mut NoProgress);
        assert!(header.contains("RECT *getRECTFields(JNIEnv *env, jobject lpObject, RECT *lpStruct);"));
        assert!(header.contains("#define RECT_sizeof() sizeof(RECT)"));
        assert!(header.contains("#define getRECTFields(a,b,c) NULL"));

        let source = generate_source(&config(), &store, &classes, &mut NoProgress);
        assert!(source.contains("typedef struct RECT_FID_CACHE {"), "{source}");
        assert!(source.contains("\tjfieldID left, top, right, bottom;"), "{source}");
        assert!(
            source.contains(
                "\tRECTFc.left = (*env)->GetFieldID(env, RECTFc.clazz, \"left\", \"I\");"
            ),
            "{source}"
        );
        assert!(
            source.contains("\tlpStruct->left = (*env)->GetIntField(env, lpObject, RECTFc.left);"),
            "{source}"
        );
        assert!(
            source.contains(
                "\t(*env)->SetIntField(env, lpObject, RECTFc.left, (jint)lpStruct->left);"
            ),
            "{source}"
        );
    }

    #[test]
    fn array_fields_copy_regions_scaled_by_width() {
        let store = shared(MetaData::new());
        let class = crate::parse::parse_source(
            "LOGFONT.java".as_ref(),
            "public class LOGFONT {\npublic char[] lfFaceName = new char[32];\npublic byte[] raw = new byte[4];\n}\n",
            store.clone(),
        )
        .unwrap();
        let classes = [class as ClassRef];
        let source = generate_source(&config(), &store, &classes, &mut NoProgress);
        assert!(
            source.contains("(*env)->GetCharArrayRegion(env, lpObject1, 0, sizeof(lpStruct->lfFaceName) / 2, (jchar *)lpStruct->lfFaceName);"),
            "{source}"
        );
        assert!(
            source.contains("(*env)->GetByteArrayRegion(env, lpObject1, 0, sizeof(lpStruct->raw), (jbyte *)lpStruct->raw);"),
            "{source}"
        );
    }

    #[test]
    fn superclass_fields_are_primed_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("NMHDR.java"),
            "public class NMHDR {\npublic int hwndFrom;\n}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("NMCUSTOMDRAW.java"),
            "public class NMCUSTOMDRAW extends NMHDR {\npublic int dwDrawStage;\n}\n",
        )
        .unwrap();
        let store = shared(MetaData::new());
        let loader = Loader::new(store.clone());
        let class = loader.load(&dir.path().join("NMCUSTOMDRAW.java")).unwrap();
        let classes = [class as ClassRef];
        let source = generate_source(&config(), &store, &classes, &mut NoProgress);
        assert!(source.contains("\tcacheNMHDRFields(env, lpObject);"), "{source}");
        assert!(
            source.contains("\tgetNMHDRFields(env, lpObject, (NMHDR *)lpStruct);"),
            "{source}"
        );
        assert!(
            source.contains("\tsetNMHDRFields(env, lpObject, (NMHDR *)lpStruct);"),
            "{source}"
        );
    }

    #[test]
    fn nested_struct_and_wince_guard() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("POINT.java"),
            "public class POINT {\npublic int x;\npublic int y;\n}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("MSG.java"),
            "public class MSG {\n\
             public POINT pt;\n\
             /** @field flags=no_wince */\n\
             public int time;\n\
             }\n",
        )
        .unwrap();
        let store = shared(MetaData::new());
        let loader = Loader::new(store.clone());
        let class = loader.load(&dir.path().join("MSG.java")).unwrap();
        let classes = [class as ClassRef];
        let source = generate_source(&config(), &store, &classes, &mut NoProgress);
        assert!(
            source.contains("\tif (lpObject1 != NULL) getPOINTFields(env, lpObject1, &lpStruct->pt);"),
            "{source}"
        );
        assert!(
            source.contains("#ifndef _WIN32_WCE\n\tlpStruct->time = (*env)->GetIntField(env, lpObject, MSGFc.time);\n#endif"),
            "{source}"
        );
    }
}
