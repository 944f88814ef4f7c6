//! End-to-end runs of the generation driver over a small platform batch.

use jnigen::app::{run, GenConfig, NoProgress};
use jnigen::model::BitMode;
use std::fs;
use std::path::Path;

const OS_JAVA: &str = "\
public class OS {
	/** @method flags=dynamic */
	public static final native int GetDpiForWindow(int /*long*/ hWnd);
	/** @param hWnd cast=(HWND) */
	public static final native boolean IsWindowVisible(int /*long*/ hWnd);
	public static final native boolean GetClientRect(int /*long*/ hWnd, RECT lpRect);
}
";

const RECT_JAVA: &str = "\
public class RECT {
	public int left, top, right, bottom;
}
";

fn write_sources(dir: &Path) {
    fs::write(dir.join("OS.java"), OS_JAVA).unwrap();
    fs::write(dir.join("RECT.java"), RECT_JAVA).unwrap();
}

fn config(src: &Path, out: &Path, meta: &Path) -> GenConfig {
    GenConfig {
        main_class: src.join("OS.java"),
        platform: "os".to_owned(),
        output_dir: out.to_path_buf(),
        metadata_dir: meta.to_path_buf(),
        bit_mode: BitMode::B64,
        cpp: false,
        enter_exit: true,
        embed: false,
    }
}

#[test]
fn generates_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&out).unwrap();
    write_sources(&src);
    fs::write(
        src.join("OS.properties"),
        "swt_copyright=/* Copyright (c) 2000, 2026 Example and others. */\n",
    )
    .unwrap();

    run(&config(&src, &out, &src), &mut NoProgress).unwrap();

    let natives = fs::read_to_string(out.join("os.c")).unwrap();
    assert!(natives.starts_with("/* Copyright (c) 2000, 2026 Example and others. */"), "{natives}");
    assert!(natives.contains("#define OS_NATIVE(func) Java_OS_##func"));
    assert!(natives.contains("OS_NATIVE(GetDpiForWindow)"), "{natives}");
    assert!(natives.contains("\t\tLOAD_FUNCTION(fp, GetDpiForWindow)"), "{natives}");
    assert!(natives.contains("(HWND)arg0"), "{natives}");
    // GetClientRect marshals the RECT out-parameter
    assert!(
        natives.contains(
            "\tif (arg1) if ((lparg1 = getRECTFields(env, arg1, &_arg1)) == NULL) goto fail;"
        ),
        "{natives}"
    );
    assert!(natives.contains("\tif (arg1 && lparg1) setRECTFields(env, arg1, lparg1);"), "{natives}");

    let structs_h = fs::read_to_string(out.join("os_structs.h")).unwrap();
    assert!(structs_h.contains("#define RECT_sizeof() sizeof(RECT)"));
    let structs_c = fs::read_to_string(out.join("os_structs.c")).unwrap();
    assert!(structs_c.contains("RECT *getRECTFields(JNIEnv *env, jobject lpObject, RECT *lpStruct)"));

    let stats_h = fs::read_to_string(out.join("os_stats.h")).unwrap();
    assert!(stats_h.contains("\tGetDpiForWindow_FUNC,"));
    let stats_c = fs::read_to_string(out.join("os_stats.c")).unwrap();
    assert!(stats_c.contains("int OS_nativeFunctionCount = 3;"), "{stats_c}");

    let meta = fs::read_to_string(out.join("os.properties")).unwrap();
    assert!(meta.contains("OS_GetDpiForWindow=flags=dynamic\n"), "{meta}");
    assert!(meta.contains("OS_IsWindowVisible_0=cast=(HWND)\n"), "{meta}");
}

#[test]
fn second_run_rewrites_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&out).unwrap();
    write_sources(&src);

    let config = config(&src, &out, &src);
    run(&config, &mut NoProgress).unwrap();
    let stamp = |name: &str| fs::metadata(out.join(name)).unwrap().modified().unwrap();
    let before: Vec<_> = ["os.c", "os_structs.h", "os_structs.c", "os_stats.h", "os_stats.c"]
        .iter()
        .map(|n| stamp(n))
        .collect();

    run(&config, &mut NoProgress).unwrap();
    let after: Vec<_> = ["os.c", "os_structs.h", "os_structs.c", "os_stats.h", "os_stats.c"]
        .iter()
        .map(|n| stamp(n))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn broken_sibling_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&out).unwrap();
    write_sources(&src);
    fs::write(src.join("Broken.java"), "this is not a class\n").unwrap();

    run(&config(&src, &out, &src), &mut NoProgress).unwrap();
    let natives = fs::read_to_string(out.join("os.c")).unwrap();
    assert!(natives.contains("OS_NATIVE(IsWindowVisible)"), "{natives}");
    assert!(!natives.contains("Broken"));
}
