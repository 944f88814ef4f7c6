use jnigen_signatures::*;

fn test_types() -> Vec<(Type, &'static str, &'static str)> {
    vec![
        (Type::Byte, "byte", "B"),
        (Type::Short, "short", "S"),
        (Type::Int, "int", "I"),
        (Type::Long, "long", "J"),
        (Type::Float, "float", "F"),
        (Type::Double, "double", "D"),
        (Type::Boolean, "boolean", "Z"),
        (Type::Char, "char", "C"),
        (Type::Byte.array_dim(3), "byte[][][]", "[[[B"),
        (Type::Boolean.array_dim(2), "boolean[][]", "[[Z"),
        (
            Type::class(vec!["java".to_owned(), "lang".to_owned()], "String"),
            "java.lang.String",
            "Ljava/lang/String;",
        ),
        (
            Type::class_fqn("java.lang.String").array().array(),
            "java.lang.String[][]",
            "[[Ljava/lang/String;",
        ),
        (Type::class_fqn("bar.Foo"), "bar.Foo", "Lbar/Foo;"),
    ]
}

#[test]
fn test_display_types_java() {
    for (ty, java_ty, _) in test_types() {
        assert_eq!(&ty.display_java().to_string(), java_ty);
    }
}

#[test]
fn test_display_types_jni() {
    for (ty, _, jni_ty) in test_types() {
        assert_eq!(&ty.display_jni().to_string(), jni_ty);
    }
}

#[test]
fn test_parse_types_jni() {
    for (ty, _, jni_ty) in test_types() {
        assert_eq!(Type::parse_jni(jni_ty).unwrap(), ty);
    }
}

#[test]
fn test_descriptor_equality_is_type_equality() {
    let a = Type::parse_jni("[[Ljava/lang/String;").unwrap();
    let b = Type::class_fqn("java.lang.String").array_dim(2);
    assert_eq!(a, b);
    assert_eq!(a.display_jni().to_string(), b.display_jni().to_string());
}

#[test]
fn test_c_types() {
    assert_eq!(Type::Int.c_type(), "jint");
    assert_eq!(Type::Void.c_type(), "void");
    assert_eq!(Type::Byte.array().c_type(), "jbyteArray");
    assert_eq!(Type::class_fqn("java.lang.String").c_type(), "jstring");
    assert_eq!(Type::class_fqn("java.lang.Object").c_type(), "jobject");
    assert_eq!(Type::class_fqn("bar.Foo").array().c_type(), "jobjectArray");
    assert_eq!(Type::Int.jni_accessor(), "Int");
    assert_eq!(Type::Int.array().jni_accessor(), "Object");
    assert_eq!(Type::class_fqn("bar.RECT").c_struct_type(false), "RECT *");
    assert_eq!(Type::class_fqn("bar.RECT").c_struct_type(true), "RECT");
    assert_eq!(Type::Char.byte_width(), 2);
    assert_eq!(Type::Double.byte_width(), 8);
}

#[test]
fn test_c_escape() {
    assert_eq!(display_c_escaped("a_b").to_string(), "a_1b");
    assert_eq!(
        display_c_escaped("Ljava/lang/String;").to_string(),
        "Ljava_lang_String_2"
    );
    assert_eq!(display_c_escaped("[I").to_string(), "_3I");
    assert_eq!(display_c_escaped("org.example.OS").to_string(), "org_example_OS");
}
