//! The natives generator: one JNI-exported C function per native method,
//! marshalling parameters in, dispatching the underlying call, and releasing
//! everything in reverse order through a shared `fail:` label.

use crate::{
    app::{GenConfig, Progress},
    generate::{env_call, Output},
    meta::{Flag, MetaRef, SharedMetaData},
    model::{function_name, is_native, ClassRef, JniClass, JniMethod, MethodRef},
};
use jnigen_signatures::{display_c_escaped, Type};
use std::fmt::Write as _;

pub fn generate(
    config: &GenConfig,
    store: &SharedMetaData,
    classes: &[ClassRef],
    progress: &mut dyn Progress,
) -> String {
    let mut out = Output::with_header(store);
    out.line(&format!("#include \"{}.h\"", config.platform));
    out.line(&format!("#include \"{}_structs.h\"", config.platform));
    out.line(&format!("#include \"{}_stats.h\"", config.platform));
    let mut gen = NativesGenerator { config, out };
    for class in classes {
        gen.generate_class(class.as_ref(), progress);
    }
    gen.out.into_string()
}

struct NativesGenerator<'a> {
    config: &'a GenConfig,
    out: Output,
}

/// How one parameter is marshalled in the generated function.
enum ParamKind {
    /// Primitives, `Object`/`Class` handles and object arrays pass through.
    Direct,
    /// Primitive array, acquired via element or critical accessors.
    Array { critical: bool },
    /// `String`, acquired as UTF or unicode chars.
    Text { unicode: bool },
    /// Struct-shaped object, copied through `get/setXFields`.
    Struct,
}

struct ParamInfo {
    index: usize,
    ty: Type,
    kind: ParamKind,
    meta: MetaRef,
}

impl ParamInfo {
    fn is_getter(&self) -> bool {
        !matches!(self.kind, ParamKind::Direct)
    }

    fn is_critical(&self) -> bool {
        matches!(self.kind, ParamKind::Array { critical: true })
    }

    /// The expression handed to the native call for this parameter.
    fn call_expr(&self) -> String {
        let mut expr = match &self.kind {
            ParamKind::Direct => format!("arg{}", self.index),
            ParamKind::Struct if self.meta.has_flag(Flag::Struct) => {
                format!("*lparg{}", self.index)
            }
            _ => format!("lparg{}", self.index),
        };
        if self.meta.has_flag(Flag::Object) {
            expr = format!("TO_OBJECT({expr})");
        }
        format!("{}{expr}", self.meta.cast())
    }

    /// The C type used when synthesizing a function-pointer typedef for this
    /// parameter. An explicit cast wins over the derived type.
    fn c_type(&self) -> String {
        let cast = self.meta.cast();
        if let Some(inner) = cast.strip_prefix('(').and_then(|c| c.strip_suffix(')')) {
            return inner.to_owned();
        }
        match &self.kind {
            ParamKind::Direct => self.ty.c_type(),
            ParamKind::Array { .. } => format!("{} *", self.ty.component().c_type()),
            ParamKind::Text { unicode: true } => "const jchar *".to_owned(),
            ParamKind::Text { unicode: false } => "const char *".to_owned(),
            ParamKind::Struct => self
                .ty
                .c_struct_type(self.meta.has_flag(Flag::Struct)),
        }
    }
}

impl NativesGenerator<'_> {
    fn generate_class(&mut self, class: &dyn JniClass, progress: &mut dyn Progress) {
        let mut methods: Vec<MethodRef> = class
            .methods()
            .into_iter()
            .filter(|m| is_native(m.as_ref()))
            .collect();
        if methods.is_empty() {
            return;
        }
        methods.sort_by_key(|m| function_name(m.as_ref()));

        let simple = class.simple_name();
        self.generate_excludes(&methods);
        self.out.blank();
        self.out.line(&format!("#ifndef {simple}_NATIVE"));
        self.out.line(&format!(
            "#define {simple}_NATIVE(func) Java_{}_##func",
            display_c_escaped(&class.fqn())
        ));
        self.out.line("#endif");

        for method in &methods {
            if !method.meta().generate() {
                continue;
            }
            let function = function_name(method.as_ref());
            progress.step(&format!("{simple}.{function}"));
            self.generate_method(class, method.as_ref(), &function);
        }
    }

    /// Groups methods that share an `exclude` guard under one conditional
    /// block of `#define NO_x` lines.
    fn generate_excludes(&mut self, methods: &[MethodRef]) {
        let mut guards: Vec<String> = Vec::new();
        for method in methods {
            let exclude = method.meta().exclude();
            if !exclude.is_empty() && !guards.contains(&exclude) {
                guards.push(exclude);
            }
        }
        for guard in &guards {
            self.out.blank();
            self.out.line(guard);
            for method in methods {
                if method.meta().exclude() == *guard {
                    self.out
                        .line(&format!("#define NO_{}", function_name(method.as_ref())));
                }
            }
            self.out.line("#endif");
        }
    }

    fn generate_method(&mut self, class: &dyn JniClass, method: &dyn JniMethod, function: &str) {
        let mode = self.config.bit_mode;
        let ret = method.return_type(mode);
        if !(ret.is_void() || ret.is_primitive() || ret.is_string() || ret.is_system_class()) {
            log::error!(
                "{}.{}: unsupported native return type {}",
                class.simple_name(),
                method.name(),
                ret.natural_name()
            );
            self.out.blank();
            self.out.line(&format!(
                "/* skipped {function}: unsupported return type {} */",
                ret.natural_name()
            ));
            return;
        }
        let params = self.param_infos(method);
        let min = min_params(method);
        if params.len() < min {
            log::error!(
                "{}.{}: calling shape needs at least {min} parameters, found {}",
                class.simple_name(),
                method.name(),
                params.len()
            );
            self.out.blank();
            self.out.line(&format!(
                "/* skipped {function}: too few parameters for its calling shape */"
            ));
            return;
        }
        let deprecations = method.meta().has_flag(Flag::IgnoreDeprecations);

        self.out.blank();
        self.out.line(&format!("#ifndef NO_{function}"));
        if deprecations {
            self.out.line("#if defined(__GNUC__)");
            self.out.line("#pragma GCC diagnostic push");
            self.out
                .line("#pragma GCC diagnostic ignored \"-Wdeprecated-declarations\"");
            self.out.line("#endif");
        }
        if self.config.cpp {
            self.generate_prototype(class, method, function, &params, &ret);
        }
        if function.starts_with("CALLBACK_") {
            self.generate_callback(class, method, function, &ret);
        } else {
            self.generate_signature(class, method, function, &params, &ret);
            if is_memmove(method, &params, &ret) {
                self.generate_memmove(class, function, &params);
            } else {
                self.generate_body(class, method, function, &params, &ret);
            }
        }
        if deprecations {
            self.out.line("#if defined(__GNUC__)");
            self.out.line("#pragma GCC diagnostic pop");
            self.out.line("#endif");
        }
        self.out.line("#endif");
    }

    fn param_infos(&self, method: &dyn JniMethod) -> Vec<ParamInfo> {
        let mode = self.config.bit_mode;
        method
            .params()
            .iter()
            .map(|param| {
                let ty = param.ty(mode);
                let meta = param.meta();
                let kind = if ty.is_primitive_array() {
                    ParamKind::Array { critical: meta.has_flag(Flag::Critical) }
                } else if ty.is_string() {
                    ParamKind::Text { unicode: meta.has_flag(Flag::Unicode) }
                } else if !ty.is_array() && !ty.is_unmarshalled() {
                    ParamKind::Struct
                } else {
                    ParamKind::Direct
                };
                ParamInfo { index: param.index(), ty, kind, meta }
            })
            .collect()
    }

    fn signature_params(&self, params: &[ParamInfo]) -> String {
        let mut text = String::new();
        for param in params {
            let _ = write!(text, ", {} arg{}", param.ty.c_type(), param.index);
        }
        text
    }

    fn generate_prototype(
        &mut self,
        class: &dyn JniClass,
        method: &dyn JniMethod,
        function: &str,
        params: &[ParamInfo],
        ret: &Type,
    ) {
        self.out.line(&format!(
            "extern \"C\" JNIEXPORT {} JNICALL {}_NATIVE({function})(JNIEnv *env, {} that{});",
            ret.c_type(),
            class.simple_name(),
            receiver(method),
            self.signature_params(params)
        ));
    }

    fn generate_signature(
        &mut self,
        class: &dyn JniClass,
        method: &dyn JniMethod,
        function: &str,
        params: &[ParamInfo],
        ret: &Type,
    ) {
        self.out.line(&format!(
            "JNIEXPORT {} JNICALL {}_NATIVE({function})",
            ret.c_type(),
            class.simple_name()
        ));
        self.out.line(&format!(
            "\t(JNIEnv *env, {} that{})",
            receiver(method),
            self.signature_params(params)
        ));
        self.out.line("{");
    }

    /// The fixed-shape struct/memory copy body for the two-argument
    /// `memmove`/`MoveMemory` natives.
    fn generate_memmove(&mut self, class: &dyn JniClass, function: &str, params: &[ParamInfo]) {
        let (object, pointer, object_first) = match (&params[0].kind, &params[1].kind) {
            (ParamKind::Struct, _) => (&params[0], &params[1], true),
            _ => (&params[1], &params[0], false),
        };
        let name = object.ty.simple_name().unwrap_or_default().to_owned();
        let i = object.index;
        self.out.line(&format!("\t{name} _arg{i}, *lparg{i}=NULL;"));
        self.enter_macro(class, function);
        if object_first {
            // Memory to object: copy in, publish the fields on the way out.
            self.out
                .line(&format!("\tif (arg{i}) if ((lparg{i} = &_arg{i}) == NULL) goto fail;"));
            self.out.line(&format!(
                "\tmemmove(lparg{i}, (void *)arg{}, sizeof({name}));",
                pointer.index
            ));
            self.out.line("fail:");
            self.out.line(&format!(
                "\tif (arg{i} && lparg{i}) set{name}Fields(env, arg{i}, lparg{i});"
            ));
        } else {
            // Object to memory: capture the fields, then copy out.
            self.out.line(&format!(
                "\tif (arg{i}) if ((lparg{i} = get{name}Fields(env, arg{i}, &_arg{i})) == NULL) goto fail;"
            ));
            self.out.line(&format!(
                "\tmemmove((void *)arg{}, lparg{i}, sizeof({name}));",
                pointer.index
            ));
            self.out.line("fail:");
        }
        self.exit_macro(class, function);
        self.out.line("}");
    }

    fn generate_body(
        &mut self,
        class: &dyn JniClass,
        method: &dyn JniMethod,
        function: &str,
        params: &[ParamInfo],
        ret: &Type,
    ) {
        for param in params {
            let i = param.index;
            match &param.kind {
                ParamKind::Direct => {}
                ParamKind::Array { .. } => {
                    self.out.line(&format!(
                        "\t{} *lparg{i}=NULL;",
                        param.ty.component().c_type()
                    ));
                }
                ParamKind::Text { unicode } => {
                    let chars = if *unicode { "const jchar" } else { "const char" };
                    self.out.line(&format!("\t{chars} *lparg{i}=NULL;"));
                }
                ParamKind::Struct => {
                    let name = param.ty.simple_name().unwrap_or_default();
                    if param.meta.has_flag(Flag::Init) {
                        self.out.line(&format!("\t{name} _arg{i}={{0}}, *lparg{i}=NULL;"));
                    } else {
                        self.out.line(&format!("\t{name} _arg{i}, *lparg{i}=NULL;"));
                    }
                }
            }
        }
        if !ret.is_void() {
            self.out.line(&format!("\t{} rc = 0;", ret.c_type()));
        }
        self.enter_macro(class, function);

        let mut has_getters = false;
        for param in params.iter().filter(|p| p.is_getter() && !p.is_critical()) {
            self.generate_getter(param);
            has_getters = true;
        }
        for param in params.iter().filter(|p| p.is_critical()) {
            self.generate_getter(param);
            has_getters = true;
        }

        self.generate_call(method, params, ret);

        if has_getters {
            self.out.line("fail:");
        }
        for param in params.iter().filter(|p| p.is_critical()).rev() {
            self.generate_setter(param);
        }
        for param in params.iter().filter(|p| p.is_getter() && !p.is_critical()).rev() {
            self.generate_setter(param);
        }

        self.exit_macro(class, function);
        if !ret.is_void() {
            self.out.line("\treturn rc;");
        }
        self.out.line("}");
    }

    fn generate_getter(&mut self, param: &ParamInfo) {
        let i = param.index;
        let arg = format!("arg{i}");
        let line = match &param.kind {
            ParamKind::Array { critical: true } => format!(
                "\tif (arg{i}) if ((lparg{i} = ({} *){}) == NULL) goto fail;",
                param.ty.component().c_type(),
                env_call(self.config.cpp, "GetPrimitiveArrayCritical", &[&arg, "NULL"])
            ),
            ParamKind::Array { critical: false } => format!(
                "\tif (arg{i}) if ((lparg{i} = {}) == NULL) goto fail;",
                env_call(
                    self.config.cpp,
                    &format!("Get{}ArrayElements", param.ty.component().jni_accessor()),
                    &[&arg, "NULL"]
                )
            ),
            ParamKind::Text { unicode } => {
                let accessor = if *unicode { "GetStringChars" } else { "GetStringUTFChars" };
                format!(
                    "\tif (arg{i}) if ((lparg{i} = {}) == NULL) goto fail;",
                    env_call(self.config.cpp, accessor, &[&arg, "NULL"])
                )
            }
            ParamKind::Struct => {
                let name = param.ty.simple_name().unwrap_or_default();
                if param.meta.has_flag(Flag::NoIn) {
                    format!("\tif (arg{i}) if ((lparg{i} = &_arg{i}) == NULL) goto fail;")
                } else {
                    format!(
                        "\tif (arg{i}) if ((lparg{i} = get{name}Fields(env, arg{i}, &_arg{i})) == NULL) goto fail;"
                    )
                }
            }
            ParamKind::Direct => return,
        };
        self.out.line(&line);
    }

    fn generate_setter(&mut self, param: &ParamInfo) {
        let i = param.index;
        let arg = format!("arg{i}");
        let lparg = format!("lparg{i}");
        let abort = if param.meta.has_flag(Flag::NoOut) { "JNI_ABORT" } else { "0" };
        let line = match &param.kind {
            ParamKind::Array { critical: true } => format!(
                "\tif (arg{i} && lparg{i}) {};",
                env_call(
                    self.config.cpp,
                    "ReleasePrimitiveArrayCritical",
                    &[&arg, &lparg, abort]
                )
            ),
            ParamKind::Array { critical: false } => format!(
                "\tif (arg{i} && lparg{i}) {};",
                env_call(
                    self.config.cpp,
                    &format!("Release{}ArrayElements", param.ty.component().jni_accessor()),
                    &[&arg, &lparg, abort]
                )
            ),
            ParamKind::Text { unicode } => {
                let accessor =
                    if *unicode { "ReleaseStringChars" } else { "ReleaseStringUTFChars" };
                format!(
                    "\tif (arg{i} && lparg{i}) {};",
                    env_call(self.config.cpp, accessor, &[&arg, &lparg])
                )
            }
            ParamKind::Struct => {
                if param.meta.has_flag(Flag::NoOut) {
                    return;
                }
                let name = param.ty.simple_name().unwrap_or_default();
                format!("\tif (arg{i} && lparg{i}) set{name}Fields(env, arg{i}, lparg{i});")
            }
            ParamKind::Direct => return,
        };
        self.out.line(&line);
    }

    /// The call dispatch: picks the calling shape from the method's name and
    /// flags and emits the assignment to `rc` when there is a return value.
    fn generate_call(&mut self, method: &dyn JniMethod, params: &[ParamInfo], ret: &Type) {
        let meta = method.meta();
        let name = if meta.accessor().is_empty() { method.name() } else { meta.accessor() };
        let prefix = if ret.is_void() {
            String::new()
        } else {
            format!("rc = ({})", ret.c_type())
        };
        let mut args: Vec<String> = params.iter().map(|p| p.call_expr()).collect();
        if meta.has_flag(Flag::Sentinel) {
            args.push("NULL".to_owned());
        }
        let arg_list = args.join(", ");

        if method.name().starts_with("VtblCall") {
            // The vtable pointer is params[1]; its narrowed type carries the
            // pointer width of the current build.
            let ptr = params[1].ty.c_type();
            let types: Vec<String> = params[1..].iter().map(|p| p.c_type()).collect();
            self.out.line(&format!(
                "\t{prefix}(({} (STDMETHODCALLTYPE *)({}))(*({ptr} **)arg1)[arg0])({});",
                ret.c_type(),
                types.join(", "),
                args[1..].join(", ")
            ));
        } else if meta.has_flag(Flag::New) || meta.has_flag(Flag::GcNew) {
            let ctor = if meta.has_flag(Flag::GcNew) {
                format!("TO_HANDLE(gcnew {name}({arg_list}))")
            } else {
                format!("new {name}({arg_list})")
            };
            self.out.line(&format!("\t{prefix}{ctor};"));
        } else if meta.has_flag(Flag::Delete) {
            let cast = object_cast(&params[0], &name);
            self.out.line(&format!("\tdelete {cast}arg0;"));
        } else if meta.has_flag(Flag::Jni) {
            self.out.line(&format!(
                "\t{prefix}{};",
                env_call(
                    self.config.cpp,
                    &name,
                    &args.iter().map(String::as_str).collect::<Vec<_>>()
                )
            ));
        } else if meta.has_flag(Flag::Cpp) {
            self.generate_cpp_call(method, params, &name, &prefix, &args);
        } else if name.starts_with("objc_msgSend_stret")
            && matches!(params.first(), Some(p) if matches!(p.kind, ParamKind::Struct))
        {
            let strukt = params[0].ty.simple_name().unwrap_or_default().to_owned();
            let types: Vec<String> = params[1..].iter().map(|p| p.c_type()).collect();
            self.out
                .line(&format!("\tif (sizeof({strukt}) > STRUCT_SIZE_LIMIT) {{"));
            self.out.line(&format!("\t\tobjc_msgSend_stret({arg_list});"));
            self.out.line("\t} else if (lparg0) {");
            self.out.line(&format!(
                "\t\t*lparg0 = (*({strukt} (*)({}))objc_msgSend)({});",
                types.join(", "),
                args[1..].join(", ")
            ));
            self.out.line("\t}");
        } else if method.name().starts_with("call") {
            let types: Vec<String> = params[1..].iter().map(|p| p.c_type()).collect();
            self.out.line(&format!(
                "\t{prefix}(({} (*)({}))arg0)({});",
                ret.c_type(),
                types.join(", "),
                args[1..].join(", ")
            ));
        } else if meta.has_flag(Flag::Const) || meta.has_flag(Flag::Address) {
            let amp = if meta.has_flag(Flag::Address) { "&" } else { "" };
            self.out.line(&format!("\t{prefix}{amp}{name};"));
        } else {
            let direct = format!("{prefix}{name}({arg_list});");
            if meta.has_flag(Flag::Dynamic) {
                self.out.line("/*");
                self.out.line(&format!("\t{direct}"));
                self.out.line("*/");
                let types: Vec<String> = params.iter().map(|p| p.c_type()).collect();
                self.out.line("\t{");
                self.out.line(&format!("\t\tLOAD_FUNCTION(fp, {name})"));
                self.out.line("\t\tif (fp) {");
                self.out.line(&format!(
                    "\t\t\t{prefix}(({} (CALLING_CONVENTION*)({}))fp)({arg_list});",
                    ret.c_type(),
                    types.join(", ")
                ));
                self.out.line("\t\t}");
                self.out.line("\t}");
            } else if meta.has_flag(Flag::TryCatch) {
                self.out.line("\t__try {");
                self.out.line(&format!("\t\t{direct}"));
                self.out.line("\t} __except(EXCEPTION_EXECUTE_HANDLER) {");
                self.out.line("\t}");
            } else {
                self.out.line(&format!("\t{direct}"));
            }
        }
    }

    /// A C++ member access through the first parameter: method call, or
    /// field access with `setter`/`getter`/`adder` semantics.
    fn generate_cpp_call(
        &mut self,
        method: &dyn JniMethod,
        params: &[ParamInfo],
        name: &str,
        prefix: &str,
        args: &[String],
    ) {
        let meta = method.meta();
        let cast = object_cast(&params[0], name);
        let receiver = format!("({cast}arg0)");
        let rest = args[1..].join(", ");
        if meta.has_flag(Flag::Setter) {
            self.out.line(&format!("\t{receiver}->{name} = {rest};"));
        } else if meta.has_flag(Flag::Adder) {
            self.out.line(&format!("\t{receiver}->{name} += {rest};"));
        } else if meta.has_flag(Flag::Getter) {
            let amp = if meta.has_flag(Flag::Address) { "&" } else { "" };
            let mut expr = format!("{amp}{receiver}->{name}");
            if meta.has_flag(Flag::GcObject) {
                expr = format!("TO_HANDLE({expr})");
            }
            self.out.line(&format!("\t{prefix}{expr};"));
        } else {
            let mut expr = format!("{receiver}->{name}({rest})");
            if meta.has_flag(Flag::GcObject) {
                expr = format!("TO_HANDLE({expr})");
            }
            self.out.line(&format!("\t{prefix}{expr};"));
        }
    }

    /// A `CALLBACK_*` native: a static function-pointer holder plus a
    /// trampoline whose C signature comes from the `callback_types` and
    /// `callback_flags` metadata. The exported function stores its argument
    /// in the holder and returns the trampoline's address.
    fn generate_callback(
        &mut self,
        class: &dyn JniClass,
        method: &dyn JniMethod,
        function: &str,
        ret: &Type,
    ) {
        let meta = method.meta();
        let types: Vec<String> = meta
            .param("callback_types")
            .split(';')
            .map(str::to_owned)
            .collect();
        let flags: Vec<String> = meta
            .param("callback_flags")
            .split(';')
            .map(str::to_owned)
            .collect();
        let cb_ret = types.first().cloned().unwrap_or_else(|| "void".to_owned());
        let cb_args = &types[1.min(types.len())..];
        let struct_return = flags.first().map(|f| f.contains("struct")).unwrap_or(false);
        let holder = ret.c_type();

        let mut decl_args = String::new();
        let mut pass_args = String::new();
        for (i, ty) in cb_args.iter().enumerate() {
            if i != 0 {
                decl_args.push_str(", ");
                pass_args.push_str(", ");
            }
            let _ = write!(decl_args, "{ty} arg{i}");
            let _ = write!(pass_args, "arg{i}");
        }
        let type_list = cb_args.join(", ");

        self.out.line(&format!("static {holder} {function};"));
        self.out
            .line(&format!("static {cb_ret} proc_{function}({decl_args})"));
        self.out.line("{");
        if struct_return {
            // The registered target returns a pointer to the struct; fall
            // back to a zeroed value when it returned NULL.
            self.out.line(&format!(
                "\t{cb_ret} *lprc = (({cb_ret} *(*)({type_list})){function})({pass_args});"
            ));
            self.out.line(&format!("\t{cb_ret} rc;"));
            self.out.line("\tif (lprc) {");
            self.out.line("\t\trc = *lprc;");
            self.out.line("\t} else {");
            self.out.line(&format!("\t\t{cb_ret} temp = {{0}};"));
            self.out.line("\t\trc = temp;");
            self.out.line("\t}");
            self.out.line("\treturn rc;");
        } else if cb_ret == "void" {
            self.out.line(&format!(
                "\t((void (*)({type_list})){function})({pass_args});"
            ));
        } else {
            self.out.line(&format!(
                "\treturn (({cb_ret} (*)({type_list})){function})({pass_args});"
            ));
        }
        self.out.line("}");

        self.out.line(&format!(
            "JNIEXPORT {holder} JNICALL {}_NATIVE({function})",
            class.simple_name()
        ));
        self.out.line(&format!(
            "\t(JNIEnv *env, {} that, {holder} arg0)",
            receiver(method)
        ));
        self.out.line("{");
        self.out.line(&format!("\t{holder} rc = 0;"));
        self.enter_macro(class, function);
        self.out.line(&format!("\t{function} = arg0;"));
        self.out
            .line(&format!("\trc = ({holder})proc_{function};"));
        self.exit_macro(class, function);
        self.out.line("\treturn rc;");
        self.out.line("}");
    }

    fn enter_macro(&mut self, class: &dyn JniClass, function: &str) {
        if self.config.enter_exit {
            self.out.line(&format!(
                "\t{}_NATIVE_ENTER(env, that, {function}_FUNC);",
                class.simple_name()
            ));
        }
    }

    fn exit_macro(&mut self, class: &dyn JniClass, function: &str) {
        if self.config.enter_exit {
            self.out.line(&format!(
                "\t{}_NATIVE_EXIT(env, that, {function}_FUNC);",
                class.simple_name()
            ));
        }
    }
}

fn receiver(method: &dyn JniMethod) -> &'static str {
    if method.modifiers().contains(crate::model::Modifier::Static) {
        "jclass"
    } else {
        "jobject"
    }
}

/// The cast used to touch a C++ object through `arg0`: the parameter's own
/// cast when present, a pointer to the accessor target otherwise.
fn object_cast(param: &ParamInfo, name: &str) -> String {
    let cast = param.meta.cast();
    if cast.is_empty() {
        format!("({name} *)")
    } else {
        cast
    }
}

/// The two-argument struct/memory copy form of `memmove`/`MoveMemory`.
/// Calling shapes that dereference fixed argument positions need at least
/// that many declared parameters.
fn min_params(method: &dyn JniMethod) -> usize {
    let meta = method.meta();
    let name = method.name();
    if name.starts_with("VtblCall") {
        2
    } else if meta.has_flag(Flag::Delete) || meta.has_flag(Flag::Cpp) || name.starts_with("call") {
        1
    } else {
        0
    }
}

fn is_memmove(method: &dyn JniMethod, params: &[ParamInfo], ret: &Type) -> bool {
    let name = method.name();
    (name.eq_ignore_ascii_case("memmove") || name == "MoveMemory")
        && ret.is_void()
        && params.len() == 2
        && (matches!(params[0].kind, ParamKind::Struct)
            ^ matches!(params[1].kind, ParamKind::Struct))
}
