//! Static type inspection for the reflective wrapper.
//!
//! `Arg` maps a Rust argument type to its descriptor and converts values in
//! and out; `Returns` does the same for return types; `Callable` is
//! implemented for every `Fn` of arity 0..=8 whose arguments are `Arg` and
//! whose return type is `Returns`.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use callkit_core::errors::{FunctionError, ValueError};
use callkit_core::types::ArgBuffer;
use callkit_core::{Context, PrimitiveKind, TypeDescriptor, Value};

/// A type that can be a wrapped function's argument.
pub trait Arg: Sized + Send + 'static {
    fn descriptor() -> TypeDescriptor;

    /// Convert a value of this type's shape. Fails with the expected and found shapes.
    fn from_value(value: Value) -> Result<Self, ValueError>;

    fn into_value(self) -> Value;
}

/// A type that can be a wrapped function's return value.
pub trait Returns: Send + 'static {
    fn result_types() -> Vec<TypeDescriptor>;

    /// Split the return value into result values, or the function's own error.
    fn into_results(self) -> Result<Vec<Value>, FunctionError>;
}

fn mismatch<T: Arg>(found: &Value) -> ValueError {
    ValueError::new(T::descriptor(), found.kind_name())
}

impl Arg for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Bool)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl Arg for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Text)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

macro_rules! impl_integer_arg {
    ($($ty:ty => $kind:ident, $variant:ident($wide:ty);)*) => {
        $(
            impl Arg for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::primitive(PrimitiveKind::$kind)
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(n) => <$ty>::try_from(n)
                            .map_err(|_| ValueError::new(PrimitiveKind::$kind, format!("{n}"))),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn into_value(self) -> Value {
                    Value::$variant(<$wide>::from(self))
                }
            }
        )*
    };
}

impl_integer_arg! {
    i8 => I8, Int(i64);
    i16 => I16, Int(i64);
    i32 => I32, Int(i64);
    i64 => I64, Int(i64);
    u8 => U8, Uint(u64);
    u16 => U16, Uint(u64);
    u32 => U32, Uint(u64);
    u64 => U64, Uint(u64);
}

impl Arg for f32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::F32)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl Arg for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::F64)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl Arg for DateTime<FixedOffset> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Instant)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Instant(t) => Ok(t),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Instant(self)
    }
}

impl Arg for DateTime<Utc> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Instant)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Instant(t) => Ok(t.with_timezone(&Utc)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Instant(self.fixed_offset())
    }
}

impl Arg for TimeDelta {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Duration)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Duration(self)
    }
}

impl Arg for Context {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Context
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Context(ctx) => Ok(ctx),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Context(self)
    }
}

impl<T: Arg> Arg for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Optional(None) => Ok(None),
            Value::Optional(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Optional(self.map(|v| Box::new(v.into_value())))
    }
}

impl<T: Arg> Arg for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(Arg::into_value).collect())
    }
}

impl<T: Arg, const N: usize> Arg for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor(), N)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Sequence(items) if items.len() == N => {
                let items = items
                    .into_iter()
                    .map(T::from_value)
                    .collect::<Result<Vec<T>, _>>()?;
                items
                    .try_into()
                    .map_err(|_| ValueError::new(Self::descriptor(), "sequence"))
            }
            Value::Sequence(items) => Err(ValueError::new(
                Self::descriptor(),
                format!("sequence of {}", items.len()),
            )),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(Arg::into_value).collect())
    }
}

/// Take a composite field by name. Used by [`composite_arg!`](crate::composite_arg).
#[doc(hidden)]
pub fn take_field(fields: &mut Vec<(String, Value)>, name: &str) -> Option<Value> {
    let index = fields.iter().position(|(n, _)| n == name)?;
    Some(fields.swap_remove(index).1)
}

impl Returns for () {
    fn result_types() -> Vec<TypeDescriptor> {
        Vec::new()
    }

    fn into_results(self) -> Result<Vec<Value>, FunctionError> {
        Ok(Vec::new())
    }
}

crate::impl_returns!(
    bool,
    String,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    DateTime<FixedOffset>,
    DateTime<Utc>,
    TimeDelta,
);

impl<T: Arg> Returns for Option<T> {
    fn result_types() -> Vec<TypeDescriptor> {
        vec![Self::descriptor()]
    }

    fn into_results(self) -> Result<Vec<Value>, FunctionError> {
        Ok(vec![self.into_value()])
    }
}

impl<T: Arg> Returns for Vec<T> {
    fn result_types() -> Vec<TypeDescriptor> {
        vec![Self::descriptor()]
    }

    fn into_results(self) -> Result<Vec<Value>, FunctionError> {
        Ok(vec![self.into_value()])
    }
}

impl<T: Arg, const N: usize> Returns for [T; N] {
    fn result_types() -> Vec<TypeDescriptor> {
        vec![Self::descriptor()]
    }

    fn into_results(self) -> Result<Vec<Value>, FunctionError> {
        Ok(vec![self.into_value()])
    }
}

macro_rules! impl_tuple_returns {
    ($($ty:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($ty: Arg),+> Returns for ($($ty,)+) {
            fn result_types() -> Vec<TypeDescriptor> {
                vec![$($ty::descriptor()),+]
            }

            fn into_results(self) -> Result<Vec<Value>, FunctionError> {
                let ($($ty,)+) = self;
                Ok(vec![$($ty.into_value()),+])
            }
        }
    };
}

impl_tuple_returns!(A);
impl_tuple_returns!(A, B);
impl_tuple_returns!(A, B, C);
impl_tuple_returns!(A, B, C, D);

impl<R, E> Returns for Result<R, E>
where
    R: Returns,
    E: Into<callkit_core::errors::BoxError> + Send + 'static,
{
    fn result_types() -> Vec<TypeDescriptor> {
        let mut types = R::result_types();
        types.push(TypeDescriptor::Error);
        types
    }

    fn into_results(self) -> Result<Vec<Value>, FunctionError> {
        match self {
            Ok(r) => r.into_results(),
            Err(e) => Err(FunctionError::new(e)),
        }
    }
}

/// Failure of [`Callable::invoke`].
#[derive(Debug)]
pub enum InvokeError {
    /// Argument `index` did not convert to its declared type.
    Argument { index: usize, cause: ValueError },
    /// The function returned its error result.
    Function(FunctionError),
}

/// A function the reflective wrapper can drive.
///
/// `Marker` is the tuple of argument types, which keeps the impls for
/// different arities apart.
pub trait Callable<Marker>: Send + Sync + 'static {
    fn arg_types() -> Vec<TypeDescriptor>;

    fn result_types() -> Vec<TypeDescriptor>;

    /// Convert each value to its argument type and call the function.
    /// Missing trailing values are filled with the type's zero value.
    fn invoke(&self, args: ArgBuffer) -> Result<Vec<Value>, InvokeError>;
}

macro_rules! impl_callable {
    ($($ty:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, R, $($ty,)*> Callable<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: Returns,
            $($ty: Arg,)*
        {
            fn arg_types() -> Vec<TypeDescriptor> {
                vec![$($ty::descriptor()),*]
            }

            fn result_types() -> Vec<TypeDescriptor> {
                R::result_types()
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn invoke(&self, args: ArgBuffer) -> Result<Vec<Value>, InvokeError> {
                let mut args = args.into_iter().enumerate();
                let mut position = 0usize;
                $(
                    let $ty = {
                        let value = match args.next() {
                            Some((_, value)) => value,
                            None => $ty::descriptor().zero_value(),
                        };
                        let converted = $ty::from_value(value)
                            .map_err(|cause| InvokeError::Argument { index: position, cause })?;
                        position += 1;
                        converted
                    };
                )*
                (self)($($ty),*).into_results().map_err(InvokeError::Function)
            }
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
impl_callable!(A1, A2, A3, A4, A5, A6, A7);
impl_callable!(A1, A2, A3, A4, A5, A6, A7, A8);
