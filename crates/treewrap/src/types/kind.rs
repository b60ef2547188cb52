use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Semantic category of a tree code, mirroring the host's code classes.
///
/// Every wrapper type belongs to exactly one class, and formatting hooks are
/// chosen per class (declarations print their name, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, serde::Serialize, serde::Deserialize)]
pub enum TreeClass {
    /// Nodes that fit no other class: identifiers, lists, blocks, SSA names.
    Exceptional,
    Constant,
    Type,
    Declaration,
    Reference,
    Comparison,
    Unary,
    Binary,
    Statement,
    /// Expressions with a variable number of operands, such as calls.
    VlExp,
    Expression,
}

impl TreeClass {
    /// Name of the class's base wrapper type.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Declares [`KindTag`] together with its class mapping.
///
/// Both the enum and [`KindTag::class`] come from the one table below, so a
/// code cannot exist without a class and the class match is exhaustive.
macro_rules! tree_codes {
    ($($name:ident = $code:literal => $class:ident,)+) => {
        /// Discriminant identifying a native node's semantic kind.
        ///
        /// The discriminant is the raw tree code reported by
        /// [`Host::tree_code`](crate::Host::tree_code).
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            EnumCount,
            EnumIter,
            FromRepr,
            IntoStaticStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[repr(u16)]
        pub enum KindTag {
            $($name = $code,)+
        }

        impl KindTag {
            /// Returns the class this kind belongs to.
            #[must_use]
            pub const fn class(self) -> TreeClass {
                match self {
                    $(Self::$name => TreeClass::$class,)+
                }
            }
        }
    };
}

tree_codes! {
    ErrorMark = 0 => Exceptional,
    IdentifierNode = 1 => Exceptional,
    TreeList = 2 => Exceptional,
    TreeVec = 3 => Exceptional,
    Block = 4 => Exceptional,
    OffsetType = 5 => Type,
    EnumeralType = 6 => Type,
    BooleanType = 7 => Type,
    IntegerType = 8 => Type,
    RealType = 9 => Type,
    PointerType = 10 => Type,
    ReferenceType = 11 => Type,
    NullptrType = 12 => Type,
    FixedPointType = 13 => Type,
    ComplexType = 14 => Type,
    VectorType = 15 => Type,
    ArrayType = 16 => Type,
    RecordType = 17 => Type,
    UnionType = 18 => Type,
    QualUnionType = 19 => Type,
    VoidType = 20 => Type,
    FunctionType = 21 => Type,
    MethodType = 22 => Type,
    LangType = 23 => Type,
    IntegerCst = 24 => Constant,
    RealCst = 25 => Constant,
    FixedCst = 26 => Constant,
    ComplexCst = 27 => Constant,
    VectorCst = 28 => Constant,
    StringCst = 29 => Constant,
    FunctionDecl = 30 => Declaration,
    LabelDecl = 31 => Declaration,
    FieldDecl = 32 => Declaration,
    VarDecl = 33 => Declaration,
    ConstDecl = 34 => Declaration,
    ParmDecl = 35 => Declaration,
    TypeDecl = 36 => Declaration,
    ResultDecl = 37 => Declaration,
    DebugExprDecl = 38 => Declaration,
    NamespaceDecl = 39 => Declaration,
    ImportedDecl = 40 => Declaration,
    TranslationUnitDecl = 41 => Declaration,
    ComponentRef = 42 => Reference,
    BitFieldRef = 43 => Reference,
    IndirectRef = 44 => Reference,
    ArrayRef = 45 => Reference,
    ArrayRangeRef = 46 => Reference,
    RealpartExpr = 47 => Reference,
    ImagpartExpr = 48 => Reference,
    ViewConvertExpr = 49 => Reference,
    ObjTypeRef = 50 => Expression,
    Constructor = 51 => Exceptional,
    CompoundExpr = 52 => Expression,
    ModifyExpr = 53 => Expression,
    InitExpr = 54 => Expression,
    TargetExpr = 55 => Expression,
    CondExpr = 56 => Expression,
    BindExpr = 57 => Expression,
    CallExpr = 58 => VlExp,
    CleanupPointExpr = 59 => Expression,
    PlusExpr = 60 => Binary,
    MinusExpr = 61 => Binary,
    MultExpr = 62 => Binary,
    PointerPlusExpr = 63 => Binary,
    TruncDivExpr = 64 => Binary,
    TruncModExpr = 65 => Binary,
    RdivExpr = 66 => Binary,
    NegateExpr = 67 => Unary,
    AbsExpr = 68 => Unary,
    BitNotExpr = 69 => Unary,
    TruthNotExpr = 70 => Expression,
    LshiftExpr = 71 => Binary,
    RshiftExpr = 72 => Binary,
    BitIorExpr = 73 => Binary,
    BitXorExpr = 74 => Binary,
    BitAndExpr = 75 => Binary,
    TruthAndifExpr = 76 => Expression,
    TruthOrifExpr = 77 => Expression,
    LtExpr = 78 => Comparison,
    LeExpr = 79 => Comparison,
    GtExpr = 80 => Comparison,
    GeExpr = 81 => Comparison,
    EqExpr = 82 => Comparison,
    NeExpr = 83 => Comparison,
    NopExpr = 84 => Unary,
    ConvertExpr = 85 => Unary,
    FloatExpr = 86 => Unary,
    AddrExpr = 87 => Expression,
    LabelExpr = 88 => Statement,
    GotoExpr = 89 => Statement,
    ReturnExpr = 90 => Statement,
    SwitchExpr = 91 => Statement,
    CaseLabelExpr = 92 => Statement,
    AsmExpr = 93 => Statement,
    SsaName = 94 => Exceptional,
    StatementList = 95 => Exceptional,
    MemRef = 96 => Reference,
    OptimizationNode = 97 => Exceptional,
    TargetOptionNode = 98 => Exceptional,
}

impl KindTag {
    /// Classifies a raw tree code, returning `None` for codes with no kind.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::from_repr(code)
    }

    /// Returns the raw tree code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Returns the kind's name, which is also its default wrapper type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// True for kinds whose wrappers expose declaration accessors.
    #[must_use]
    pub const fn is_declaration(self) -> bool {
        matches!(self.class(), TreeClass::Declaration)
    }
}
