//! # Capability Table
//!
//! The operation vocabulary as plain enums, the element-kind tags, and the
//! per-ISA table of which (operation, kind) pairs have a native kernel.
//!
//! This file is self-contained: `build.rs` includes it with `#[path]` to
//! print emulation diagnostics, so it must not name anything from the crate.

/// Runtime tag for a lane scalar type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElemKind {
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl ElemKind {
    /// Every kind, narrowest unsigned first.
    pub const ALL: [ElemKind; 10] = [
        ElemKind::U8,
        ElemKind::U16,
        ElemKind::U32,
        ElemKind::U64,
        ElemKind::I8,
        ElemKind::I16,
        ElemKind::I32,
        ElemKind::I64,
        ElemKind::F32,
        ElemKind::F64,
    ];

    /// Width of one lane in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            ElemKind::U8 | ElemKind::I8 => 1,
            ElemKind::U16 | ElemKind::I16 => 2,
            ElemKind::U32 | ElemKind::I32 | ElemKind::F32 => 4,
            ElemKind::U64 | ElemKind::I64 | ElemKind::F64 => 8,
        }
    }

    /// Width of one lane in bits.
    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ElemKind::F32 | ElemKind::F64)
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            ElemKind::I8 | ElemKind::I16 | ElemKind::I32 | ElemKind::I64
        )
    }

    pub const fn is_unsigned(self) -> bool {
        !self.is_float() && !self.is_signed()
    }

    /// Short name as written in Rust source.
    pub const fn name(self) -> &'static str {
        match self {
            ElemKind::U8 => "u8",
            ElemKind::U16 => "u16",
            ElemKind::U32 => "u32",
            ElemKind::U64 => "u64",
            ElemKind::I8 => "i8",
            ElemKind::I16 => "i16",
            ElemKind::I32 => "i32",
            ElemKind::I64 => "i64",
            ElemKind::F32 => "f32",
            ElemKind::F64 => "f64",
        }
    }

    // Run-time mirror of the element-level sibling table in `registry`.

    /// Same-width signed integer counterpart.
    pub const fn signed(self) -> Option<ElemKind> {
        Some(match self {
            ElemKind::U8 | ElemKind::I8 => ElemKind::I8,
            ElemKind::U16 | ElemKind::I16 => ElemKind::I16,
            ElemKind::U32 | ElemKind::I32 | ElemKind::F32 => ElemKind::I32,
            ElemKind::U64 | ElemKind::I64 | ElemKind::F64 => ElemKind::I64,
        })
    }

    /// Same-width unsigned integer counterpart.
    pub const fn unsigned(self) -> Option<ElemKind> {
        Some(match self {
            ElemKind::U8 | ElemKind::I8 => ElemKind::U8,
            ElemKind::U16 | ElemKind::I16 => ElemKind::U16,
            ElemKind::U32 | ElemKind::I32 | ElemKind::F32 => ElemKind::U32,
            ElemKind::U64 | ElemKind::I64 | ElemKind::F64 => ElemKind::U64,
        })
    }

    /// Same-width float counterpart. There are no 8- or 16-bit floats.
    pub const fn float(self) -> Option<ElemKind> {
        match self.bytes() {
            4 => Some(ElemKind::F32),
            8 => Some(ElemKind::F64),
            _ => None,
        }
    }

    /// Half-width kind of the same family.
    pub const fn narrower(self) -> Option<ElemKind> {
        match self {
            ElemKind::U16 => Some(ElemKind::U8),
            ElemKind::U32 => Some(ElemKind::U16),
            ElemKind::U64 => Some(ElemKind::U32),
            ElemKind::I16 => Some(ElemKind::I8),
            ElemKind::I32 => Some(ElemKind::I16),
            ElemKind::I64 => Some(ElemKind::I32),
            ElemKind::F64 => Some(ElemKind::F32),
            ElemKind::U8 | ElemKind::I8 | ElemKind::F32 => None,
        }
    }

    /// Double-width kind of the same family.
    pub const fn wider(self) -> Option<ElemKind> {
        match self {
            ElemKind::U8 => Some(ElemKind::U16),
            ElemKind::U16 => Some(ElemKind::U32),
            ElemKind::U32 => Some(ElemKind::U64),
            ElemKind::I8 => Some(ElemKind::I16),
            ElemKind::I16 => Some(ElemKind::I32),
            ElemKind::I32 => Some(ElemKind::I64),
            ElemKind::F32 => Some(ElemKind::F64),
            ElemKind::U64 | ElemKind::I64 | ElemKind::F64 => None,
        }
    }
}

/// Lane-wise binary operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    /// Saturating add.
    SatAdd,
    /// Saturating subtract.
    SatSub,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 11] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Min,
        BinaryOp::Max,
        BinaryOp::SatAdd,
        BinaryOp::SatSub,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
    ];
}

/// Lane-wise unary operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    Not,
    /// Float kinds only.
    Sqrt,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 4] = [UnaryOp::Neg, UnaryOp::Abs, UnaryOp::Not, UnaryOp::Sqrt];
}

/// Three-operand fused operations. Single rounding for floats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FusedOp {
    /// `a * b + c`
    MulAdd,
    /// `a * b - c`
    MulSub,
}

/// Lane-wise comparisons producing a mask.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub const ALL: [CmpOp; 6] = [CmpOp::Eq, CmpOp::Ne, CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge];
}

/// Horizontal reductions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    Add,
    Mul,
    And,
    Or,
    Xor,
    Max,
    Min,
}

impl ReduceOp {
    pub const ALL: [ReduceOp; 7] = [
        ReduceOp::Add,
        ReduceOp::Mul,
        ReduceOp::And,
        ReduceOp::Or,
        ReduceOp::Xor,
        ReduceOp::Max,
        ReduceOp::Min,
    ];

    /// The lane-wise operation the reduction folds with.
    pub const fn binary(self) -> BinaryOp {
        match self {
            ReduceOp::Add => BinaryOp::Add,
            ReduceOp::Mul => BinaryOp::Mul,
            ReduceOp::And => BinaryOp::And,
            ReduceOp::Or => BinaryOp::Or,
            ReduceOp::Xor => BinaryOp::Xor,
            ReduceOp::Max => BinaryOp::Max,
            ReduceOp::Min => BinaryOp::Min,
        }
    }
}

/// Shift and rotate operations on integer kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    Left,
    /// Logical for unsigned kinds, arithmetic for signed kinds.
    Right,
    RotateLeft,
    RotateRight,
}

impl ShiftOp {
    pub const ALL: [ShiftOp; 4] = [
        ShiftOp::Left,
        ShiftOp::Right,
        ShiftOp::RotateLeft,
        ShiftOp::RotateRight,
    ];
}

/// One plugin entry point, as seen by the capability table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Binary(BinaryOp),
    Unary(UnaryOp),
    Fused(FusedOp),
    Compare(CmpOp),
    Reduce(ReduceOp),
    /// Shift by one amount shared by every lane.
    ShiftUniform(ShiftOp),
    /// Shift by a per-lane amount.
    ShiftLanes(ShiftOp),
    Blend,
    /// Numeric conversion to the given kind.
    Convert(ElemKind),
    Swizzle,
    Gather,
    Scatter,
}

impl Op {
    /// Whether `op` is part of the contract for `kind` at all.
    pub const fn applies_to(self, kind: ElemKind) -> bool {
        match self {
            Op::Binary(BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
            | Op::Unary(UnaryOp::Not)
            | Op::Reduce(ReduceOp::And | ReduceOp::Or | ReduceOp::Xor)
            | Op::ShiftUniform(_)
            | Op::ShiftLanes(_) => !kind.is_float(),
            Op::Unary(UnaryOp::Neg | UnaryOp::Abs) => !kind.is_unsigned(),
            Op::Unary(UnaryOp::Sqrt) => kind.is_float(),
            _ => true,
        }
    }

    /// Every op in the vocabulary that applies to `kind`, for diagnostics.
    pub fn for_kind(kind: ElemKind) -> impl Iterator<Item = Op> {
        let binary = BinaryOp::ALL.into_iter().map(Op::Binary);
        let unary = UnaryOp::ALL.into_iter().map(Op::Unary);
        let fused = [FusedOp::MulAdd, FusedOp::MulSub].into_iter().map(Op::Fused);
        let compare = CmpOp::ALL.into_iter().map(Op::Compare);
        let reduce = ReduceOp::ALL.into_iter().map(Op::Reduce);
        let uniform = ShiftOp::ALL.into_iter().map(Op::ShiftUniform);
        let lanes = ShiftOp::ALL.into_iter().map(Op::ShiftLanes);
        let convert = [kind.wider(), kind.narrower(), kind.signed(), kind.unsigned(), kind.float()]
            .into_iter()
            .flatten()
            .filter(move |to| *to != kind)
            .map(Op::Convert);
        let misc = [Op::Blend, Op::Swizzle, Op::Gather, Op::Scatter].into_iter();
        binary
            .chain(unary)
            .chain(fused)
            .chain(compare)
            .chain(reduce)
            .chain(uniform)
            .chain(lanes)
            .chain(convert)
            .chain(misc)
            .filter(move |op| op.applies_to(kind))
    }
}

impl core::fmt::Display for Op {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Op::Binary(op) => write!(f, "binary.{op:?}"),
            Op::Unary(op) => write!(f, "unary.{op:?}"),
            Op::Fused(op) => write!(f, "fused.{op:?}"),
            Op::Compare(op) => write!(f, "compare.{op:?}"),
            Op::Reduce(op) => write!(f, "reduce.{op:?}"),
            Op::ShiftUniform(op) => write!(f, "shift.{op:?}"),
            Op::ShiftLanes(op) => write!(f, "shiftv.{op:?}"),
            Op::Blend => f.write_str("blend"),
            Op::Convert(to) => write!(f, "convert->{}", to.name()),
            Op::Swizzle => f.write_str("swizzle"),
            Op::Gather => f.write_str("gather"),
            Op::Scatter => f.write_str("scatter"),
        }
    }
}

/// x86 ISA extensions the plugin can be compiled against.
///
/// SSE2 is implied by `x86_64`. Everything above it is opt-in through
/// `-C target-feature`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IsaFeatures {
    pub sse41: bool,
    pub sse42: bool,
    pub fma: bool,
}

impl IsaFeatures {
    /// The features this crate is being compiled with.
    pub const TARGET: IsaFeatures = IsaFeatures {
        sse41: cfg!(target_feature = "sse4.1"),
        sse42: cfg!(target_feature = "sse4.2"),
        fma: cfg!(target_feature = "fma"),
    };

    /// Parses the comma-separated list cargo exposes to build scripts in
    /// `CARGO_CFG_TARGET_FEATURE`.
    pub fn from_cargo_list(list: &str) -> IsaFeatures {
        let mut isa = IsaFeatures::default();
        for feature in list.split(',') {
            match feature.trim() {
                "sse4.1" => isa.sse41 = true,
                "sse4.2" => isa.sse42 = true,
                "fma" => isa.fma = true,
                _ => {}
            }
        }
        isa
    }
}

/// Width of one native x86 register in bytes.
pub const X86_REGISTER_BYTES: usize = 16;

/// Whether the x86 plugin has a native (or composed-native) kernel for
/// `op` on `kind` under `isa`. `false` means the op is serviced by the
/// scalar emulation. Vectors narrower than one register always are.
pub const fn x86_native(op: Op, kind: ElemKind, isa: IsaFeatures) -> bool {
    use ElemKind::*;
    let float = kind.is_float();
    let bytes = kind.bytes();
    match op {
        Op::Binary(b) => match b {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => true,
            BinaryOp::Mul => match kind {
                U16 | I16 | F32 | F64 => true,
                // pmulld on SSE4.1, pmuludq halves otherwise
                U32 | I32 => true,
                U8 | I8 | U64 | I64 => false,
            },
            BinaryOp::Div => float,
            BinaryOp::Min | BinaryOp::Max => match kind {
                U64 | I64 => isa.sse42,
                _ => true,
            },
            BinaryOp::SatAdd | BinaryOp::SatSub => match kind {
                U8 | U16 | I8 | I16 | U32 | F32 | F64 => true,
                U64 | I32 | I64 => false,
            },
        },
        Op::Unary(u) => match u {
            UnaryOp::Not | UnaryOp::Neg => true,
            UnaryOp::Abs => match kind {
                I64 => false,
                _ => true,
            },
            UnaryOp::Sqrt => float,
        },
        Op::Fused(_) => match kind {
            F32 | F64 => isa.fma,
            U8 | I8 | U64 | I64 => false,
            U16 | I16 | U32 | I32 => true,
        },
        Op::Compare(c) => match kind {
            F32 | F64 => true,
            U64 | I64 => match c {
                CmpOp::Eq | CmpOp::Ne => true,
                _ => isa.sse42,
            },
            _ => true,
        },
        Op::Reduce(r) => x86_native(Op::Binary(r.binary()), kind, isa),
        Op::ShiftUniform(s) => match s {
            ShiftOp::Right => matches!(kind, U16 | U32 | U64 | I16 | I32),
            _ => bytes >= 2,
        },
        Op::ShiftLanes(_) => false,
        Op::Blend => true,
        Op::Convert(to) => x86_native_convert(kind, to),
        Op::Swizzle | Op::Gather | Op::Scatter => false,
    }
}

/// Conversions with a native kernel. Anything not listed (notably float to
/// integer, whose saturating `as` semantics SSE2 cannot reproduce) is
/// emulated.
pub const fn x86_native_convert(from: ElemKind, to: ElemKind) -> bool {
    use ElemKind::*;
    matches!(
        (from, to),
        (U8, U16)
            | (U16, U32)
            | (U32, U64)
            | (I8, I16)
            | (I16, I32)
            | (I32, I64)
            | (U16, U8)
            | (U32, U16)
            | (U64, U32)
            | (I16, I8)
            | (I32, I16)
            | (I64, I32)
            | (I32, F32)
            | (F32, F64)
            | (F64, F32)
            | (U32, I32)
            | (I32, U32)
            | (U64, I64)
            | (I64, U64)
            | (U8, I8)
            | (I8, U8)
            | (U16, I16)
            | (I16, U16)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_mirror_is_consistent() {
        for kind in ElemKind::ALL {
            if let Some(w) = kind.wider() {
                assert_eq!(w.narrower(), Some(kind), "{}", kind.name());
                assert_eq!(w.bytes(), kind.bytes() * 2);
            }
            assert_eq!(kind.signed().map(|s| s.bytes()), Some(kind.bytes()));
            assert_eq!(kind.unsigned().map(|s| s.bytes()), Some(kind.bytes()));
        }
        assert_eq!(ElemKind::U8.float(), None);
        assert_eq!(ElemKind::U64.float(), Some(ElemKind::F64));
        assert_eq!(ElemKind::F32.narrower(), None);
    }

    #[test]
    fn feature_list_parsing() {
        let isa = IsaFeatures::from_cargo_list("fxsr,sse,sse2,sse4.1,fma");
        assert!(isa.sse41);
        assert!(!isa.sse42);
        assert!(isa.fma);
    }

    #[test]
    fn baseline_gaps() {
        let sse2 = IsaFeatures::default();
        assert!(!x86_native(Op::Binary(BinaryOp::Mul), ElemKind::U64, sse2));
        assert!(!x86_native(Op::Binary(BinaryOp::Div), ElemKind::U32, sse2));
        assert!(x86_native(Op::Binary(BinaryOp::Div), ElemKind::F32, sse2));
        assert!(!x86_native(Op::Compare(CmpOp::Gt), ElemKind::U64, sse2));
        assert!(x86_native(Op::Compare(CmpOp::Eq), ElemKind::U64, sse2));
        assert!(!x86_native(Op::Fused(FusedOp::MulAdd), ElemKind::F32, sse2));
        let fma = IsaFeatures { fma: true, ..sse2 };
        assert!(x86_native(Op::Fused(FusedOp::MulAdd), ElemKind::F32, fma));
    }

    #[test]
    fn float_kinds_have_no_bit_ops() {
        let ops: Vec<Op> = Op::for_kind(ElemKind::F32).collect();
        assert!(!ops.contains(&Op::Binary(BinaryOp::And)));
        assert!(!ops.iter().any(|op| matches!(op, Op::ShiftUniform(_))));
        assert!(ops.contains(&Op::Unary(UnaryOp::Sqrt)));
        let ints: Vec<Op> = Op::for_kind(ElemKind::U32).collect();
        assert!(!ints.contains(&Op::Unary(UnaryOp::Sqrt)));
        assert!(ints.contains(&Op::Convert(ElemKind::F32)));
    }
}
