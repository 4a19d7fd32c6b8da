//! Multipart upload integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
    use md5::Digest;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    const FIVE_MIB: usize = 5 * 1024 * 1024;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_assemble_object_with_composite_etag() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "mpu").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("big")
            .send()
            .await
            .expect("create upload");
        let upload_id = create.upload_id().expect("upload id");

        let part1_data = vec![0x61_u8; FIVE_MIB];
        let part1 = client
            .upload_part()
            .bucket(&bucket)
            .key("big")
            .upload_id(upload_id)
            .part_number(1)
            .body(ByteStream::from(part1_data.clone()))
            .send()
            .await
            .expect("part 1");
        let part2 = client
            .upload_part()
            .bucket(&bucket)
            .key("big")
            .upload_id(upload_id)
            .part_number(2)
            .body(ByteStream::from_static(b"tail"))
            .send()
            .await
            .expect("part 2");

        let completed = CompletedMultipartUpload::builder()
            .parts(
                CompletedPart::builder()
                    .part_number(1)
                    .e_tag(part1.e_tag().unwrap_or_default())
                    .build(),
            )
            .parts(
                CompletedPart::builder()
                    .part_number(2)
                    .e_tag(part2.e_tag().unwrap_or_default())
                    .build(),
            )
            .build();
        let complete = client
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("big")
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .expect("complete");

        // The documented composite formula: md5 of the concatenated part
        // MD5 digests, suffixed with the part count.
        let mut concat = Vec::new();
        concat.extend_from_slice(&md5::Md5::digest(&part1_data));
        concat.extend_from_slice(&md5::Md5::digest(b"tail"));
        let expected = format!("\"{}-2\"", hex::encode(md5::Md5::digest(&concat)));
        assert_eq!(complete.e_tag(), Some(expected.as_str()));

        let got = client
            .get_object()
            .bucket(&bucket)
            .key("big")
            .send()
            .await
            .expect("get assembled");
        let data = got.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.len(), FIVE_MIB + 4);
        assert_eq!(&data[FIVE_MIB..], b"tail");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_small_non_final_part() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "small").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("tiny")
            .send()
            .await
            .expect("create upload");
        let upload_id = create.upload_id().expect("upload id");

        let mut etags = Vec::new();
        for part_number in 1..=2 {
            let part = client
                .upload_part()
                .bucket(&bucket)
                .key("tiny")
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from_static(b"way too small"))
                .send()
                .await
                .expect("part");
            etags.push(part.e_tag().unwrap_or_default().to_owned());
        }

        let completed = CompletedMultipartUpload::builder()
            .parts(
                CompletedPart::builder()
                    .part_number(1)
                    .e_tag(&etags[0])
                    .build(),
            )
            .parts(
                CompletedPart::builder()
                    .part_number(2)
                    .e_tag(&etags[1])
                    .build(),
            )
            .build();
        let err = client
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("tiny")
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .expect_err("non-final part under 5 MiB");
        assert!(err.into_service_error().to_string().contains("EntityTooSmall"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_abort_upload_and_report_unknown_id() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "abort").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("gone")
            .send()
            .await
            .expect("create upload");
        let upload_id = create.upload_id().expect("upload id");

        client
            .abort_multipart_upload()
            .bucket(&bucket)
            .key("gone")
            .upload_id(upload_id)
            .send()
            .await
            .expect("abort");

        let err = client
            .abort_multipart_upload()
            .bucket(&bucket)
            .key("gone")
            .upload_id(upload_id)
            .send()
            .await
            .expect_err("second abort");
        assert!(err.into_service_error().to_string().contains("NoSuchUpload"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_parts_and_uploads() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "plist").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("staged")
            .send()
            .await
            .expect("create upload");
        let upload_id = create.upload_id().expect("upload id").to_owned();

        client
            .upload_part()
            .bucket(&bucket)
            .key("staged")
            .upload_id(&upload_id)
            .part_number(1)
            .body(ByteStream::from_static(b"part data"))
            .send()
            .await
            .expect("part");

        let uploads = client
            .list_multipart_uploads()
            .bucket(&bucket)
            .send()
            .await
            .expect("list uploads");
        assert!(
            uploads
                .uploads()
                .iter()
                .any(|u| u.upload_id() == Some(upload_id.as_str()))
        );

        let parts = client
            .list_parts()
            .bucket(&bucket)
            .key("staged")
            .upload_id(&upload_id)
            .send()
            .await
            .expect("list parts");
        assert_eq!(parts.parts().len(), 1);
        assert_eq!(parts.parts()[0].part_number(), Some(1));
        assert_eq!(parts.parts()[0].size(), Some(9));

        cleanup_bucket(&client, &bucket).await;
    }
}
