//! The stats generator: per-function call counters behind `NATIVE_STATS`,
//! plus the `_FUNC` enum the natives bodies index them with.

use crate::{
    app::GenConfig,
    generate::Output,
    meta::SharedMetaData,
    model::{function_name, is_native, ClassRef, JniClass},
};

/// Every native function of a class, ordered the way the natives generator
/// emits them so the `_FUNC` indices line up.
fn function_names(class: &dyn JniClass) -> Vec<String> {
    let mut names: Vec<(String, String)> = class
        .methods()
        .into_iter()
        .filter(|m| is_native(m.as_ref()))
        .map(|m| (m.name(), function_name(m.as_ref())))
        .collect();
    names.sort();
    names.into_iter().map(|(_, function)| function).collect()
}

pub fn generate_header(
    config: &GenConfig,
    store: &SharedMetaData,
    classes: &[ClassRef],
) -> String {
    let mut out = Output::with_header(store);
    out.line(&format!("#include \"{}.h\"", config.platform));
    for class in classes {
        let simple = class.simple_name();
        let names = function_names(class.as_ref());
        out.blank();
        out.line("#ifdef NATIVE_STATS");
        out.line(&format!("extern int {simple}_nativeFunctionCount;"));
        out.line(&format!("extern int {simple}_nativeFunctionCallCount[];"));
        out.line(&format!("extern char * {simple}_nativeFunctionNames[];"));
        out.line(&format!(
            "#define {simple}_NATIVE_ENTER(env, that, func) {simple}_nativeFunctionCallCount[func]++;"
        ));
        out.line(&format!("#define {simple}_NATIVE_EXIT(env, that, func) "));
        out.line("#else");
        out.line(&format!("#ifndef {simple}_NATIVE_ENTER"));
        out.line(&format!("#define {simple}_NATIVE_ENTER(env, that, func) "));
        out.line("#endif");
        out.line(&format!("#ifndef {simple}_NATIVE_EXIT"));
        out.line(&format!("#define {simple}_NATIVE_EXIT(env, that, func) "));
        out.line("#endif");
        out.line("#endif");
        out.blank();
        out.line("typedef enum {");
        for name in &names {
            out.line(&format!("\t{name}_FUNC,"));
        }
        out.line(&format!("}} {simple}_FUNCS;"));
    }
    out.into_string()
}

pub fn generate_source(
    config: &GenConfig,
    store: &SharedMetaData,
    classes: &[ClassRef],
) -> String {
    let mut out = Output::with_header(store);
    out.line(&format!("#include \"{}_stats.h\"", config.platform));
    out.blank();
    out.line("#ifdef NATIVE_STATS");
    for class in classes {
        let simple = class.simple_name();
        let names = function_names(class.as_ref());
        out.blank();
        out.line(&format!("int {simple}_nativeFunctionCount = {};", names.len()));
        out.line(&format!("int {simple}_nativeFunctionCallCount[{}];", names.len()));
        out.line(&format!("char * {simple}_nativeFunctionNames[] = {{"));
        for name in &names {
            out.line(&format!("\t\"{name}\","));
        }
        out.line("};");
    }
    out.blank();
    out.line("#endif");
    out.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{shared, MetaData};
    use crate::model::BitMode;
    use std::path::PathBuf;

    fn config() -> GenConfig {
        GenConfig {
            main_class: PathBuf::from("Test.java"),
            platform: "test".to_owned(),
            output_dir: PathBuf::from("."),
            metadata_dir: PathBuf::from("."),
            bit_mode: BitMode::B64,
            cpp: false,
            enter_exit: true,
            embed: false,
        }
    }

    fn class(store: &SharedMetaData) -> ClassRef {
        crate::parse::parse_source(
            "OS.java".as_ref(),
            "public class OS {\n\
             public static final native int GetVersion();\n\
             public static final native int Beep(int freq, int dur);\n\
             public static final native void Beep(byte[] data);\n\
             }\n",
            store.clone(),
        )
        .unwrap()
    }

    #[test]
    fn function_enum_is_sorted_by_mangled_name() {
        let store = shared(MetaData::new());
        let classes = [class(&store)];
        let header = generate_header(&config(), &store, &classes);
        let beep_arr = header.find("\tBeep___3B_FUNC,").unwrap();
        let beep_ii = header.find("\tBeep__II_FUNC,").unwrap();
        let version = header.find("\tGetVersion_FUNC,").unwrap();
        assert!(beep_ii < beep_arr && beep_arr < version, "{header}");
        assert!(header.contains("} OS_FUNCS;"));
        assert!(header.contains(
            "#define OS_NATIVE_ENTER(env, that, func) OS_nativeFunctionCallCount[func]++;"
        ));
    }

    #[test]
    fn counter_tables_match_function_count() {
        let store = shared(MetaData::new());
        let classes = [class(&store)];
        let source = generate_source(&config(), &store, &classes);
        assert!(source.contains("#include \"test_stats.h\""));
        assert!(source.contains("int OS_nativeFunctionCount = 3;"), "{source}");
        assert!(source.contains("int OS_nativeFunctionCallCount[3];"));
        assert!(source.contains("\t\"Beep__II\","), "{source}");
        assert!(source.contains("\t\"GetVersion\","));
    }
}
