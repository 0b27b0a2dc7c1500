//! Macros that make user types usable as arguments and results.

/// Implement `Returns` for types that are `Arg`. One result slot per value.
#[doc(hidden)]
#[macro_export]
macro_rules! impl_returns {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Returns for $ty {
                fn result_types() -> ::std::vec::Vec<$crate::TypeDescriptor> {
                    ::std::vec![<$ty as $crate::Arg>::descriptor()]
                }

                fn into_results(
                    self,
                ) -> ::std::result::Result<::std::vec::Vec<$crate::Value>, $crate::FunctionError> {
                    ::std::result::Result::Ok(::std::vec![$crate::Arg::into_value(self)])
                }
            }
        )*
    };
}

/// Make a struct with named fields an argument and result type.
///
/// The struct is described as a composite with the listed fields in order.
/// Text arguments of the type are read as a JSON object.
///
/// ```
/// use callkit_engine::composite_arg;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Point {
///     pub x: f64,
///     pub y: f64,
/// }
///
/// composite_arg!(Point { x: f64, y: f64 });
/// ```
#[macro_export]
macro_rules! composite_arg {
    ($name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        impl $crate::Arg for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Composite($crate::CompositeType::new(
                    ::std::stringify!($name),
                    ::std::vec![
                        $($crate::Field::new(
                            ::std::stringify!($field),
                            <$ty as $crate::Arg>::descriptor(),
                        )),*
                    ],
                ))
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                match value {
                    $crate::Value::Composite(mut fields) => ::std::result::Result::Ok(Self {
                        $($field: {
                            let raw = $crate::typed::take_field(&mut fields, ::std::stringify!($field))
                                .unwrap_or_else(|| <$ty as $crate::Arg>::descriptor().zero_value());
                            <$ty as $crate::Arg>::from_value(raw)?
                        },)*
                    }),
                    other => ::std::result::Result::Err($crate::ValueError::new(
                        ::std::stringify!($name),
                        other.kind_name(),
                    )),
                }
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Composite(::std::vec![
                    $((
                        ::std::string::String::from(::std::stringify!($field)),
                        $crate::Arg::into_value(self.$field),
                    )),*
                ])
            }
        }

        $crate::impl_returns!($name);
    };
}

/// Make a type that parses itself from text an opaque argument and result type.
///
/// The type must implement `FromStr` (with an error convertible into a boxed
/// error), `Display`, `Default`, `Clone`, `Send` and `Sync`. Its `Display`
/// output is the value's canonical text and `Default` is its zero value.
/// `options = [...]` declares the accepted values, which form renderers show
/// as a select list.
#[macro_export]
macro_rules! opaque_arg {
    ($name:ident) => {
        $crate::opaque_arg!(@impl $name, |ty| ty);
    };
    ($name:ident, options = [$($option:expr),* $(,)?]) => {
        $crate::opaque_arg!(@impl $name, |ty| ty.with_options([$($option),*]));
    };
    (@impl $name:ident, |$ty:ident| $extend:expr) => {
        impl $crate::Arg for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                let $ty = $crate::OpaqueType::new(::std::stringify!($name))
                    .with_parser(|text| {
                        let parsed = text
                            .parse::<$name>()
                            .map_err(::std::convert::Into::<$crate::BoxError>::into)?;
                        ::std::result::Result::Ok($crate::Arg::into_value(parsed))
                    })
                    .with_zero(|| $crate::Arg::into_value(<$name as ::std::default::Default>::default()));
                $crate::TypeDescriptor::Opaque($extend)
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                match value {
                    $crate::Value::Opaque(opaque) if opaque.type_name() == ::std::stringify!($name) => {
                        match opaque.downcast_ref::<$name>() {
                            ::std::option::Option::Some(inner) => ::std::result::Result::Ok(inner.clone()),
                            ::std::option::Option::None => opaque.text().parse::<$name>().map_err(|_| {
                                $crate::ValueError::new(::std::stringify!($name), opaque.text())
                            }),
                        }
                    }
                    other => ::std::result::Result::Err($crate::ValueError::new(
                        ::std::stringify!($name),
                        other.kind_name(),
                    )),
                }
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Opaque($crate::OpaqueValue::new(
                    ::std::stringify!($name),
                    ::std::string::ToString::to_string(&self),
                    self,
                ))
            }
        }

        $crate::impl_returns!($name);
    };
}
