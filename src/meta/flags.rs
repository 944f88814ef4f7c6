/// The recognized tokens of an attribute bag's `flags` list.
///
/// Unknown tokens are preserved verbatim in the bag. A few entries (`cast`,
/// `m`) are carried for store compatibility even though no current generator
/// branches on them.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Flag {
    NoGen,
    NoIn,
    NoOut,
    NoWinCE,
    Critical,
    Init,
    Struct,
    Unicode,
    Sentinel,
    Cpp,
    New,
    Delete,
    Const,
    Dynamic,
    Jni,
    Address,
    // generator-specific extensions
    Setter,
    Getter,
    Adder,
    Object,
    Cast,
    GcNew,
    M,
    TryCatch,
    IgnoreDeprecations,
    GcObject,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::NoGen => "no_gen",
            Flag::NoIn => "no_in",
            Flag::NoOut => "no_out",
            Flag::NoWinCE => "no_wince",
            Flag::Critical => "critical",
            Flag::Init => "init",
            Flag::Struct => "struct",
            Flag::Unicode => "unicode",
            Flag::Sentinel => "sentinel",
            Flag::Cpp => "cpp",
            Flag::New => "new",
            Flag::Delete => "delete",
            Flag::Const => "const",
            Flag::Dynamic => "dynamic",
            Flag::Jni => "jni",
            Flag::Address => "address",
            Flag::Setter => "setter",
            Flag::Getter => "getter",
            Flag::Adder => "adder",
            Flag::Object => "object",
            Flag::Cast => "cast",
            Flag::GcNew => "gcnew",
            Flag::M => "m",
            Flag::TryCatch => "trycatch",
            Flag::IgnoreDeprecations => "ignore_deprecations",
            Flag::GcObject => "gcobject",
        }
    }
}
